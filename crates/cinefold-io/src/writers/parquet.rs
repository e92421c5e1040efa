//! Parquet writer (enabled with `--features parquet`).
//!
//! Records are buffered into arrow builders and flushed as one row group per
//! `write_batch` call.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::builder::{
    BooleanBuilder, Float64Builder, Int32Builder, Int64Builder, ListBuilder, StringBuilder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::ArrowWriter;

use cinefold_core::model::MovieRecord;

use super::{RecordSink, StagedFile};
use crate::error::{Error, Result};

pub struct ParquetWriter {
    staged: StagedFile,
    schema: SchemaRef,
    writer: ArrowWriter<File>,
}

fn list_of_utf8() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
}

pub fn arrow_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("tconst", DataType::Utf8, false),
        Field::new("primaryTitle", DataType::Utf8, true),
        Field::new("isAdult", DataType::Boolean, true),
        Field::new("startYear", DataType::Int32, false),
        Field::new("runtimeMinutes", DataType::Int32, false),
        Field::new("genres", list_of_utf8(), false),
        Field::new("averageRating", DataType::Float64, false),
        Field::new("numVotes", DataType::Int64, false),
        Field::new("directorName", DataType::Utf8, true),
        Field::new("actors", list_of_utf8(), false),
    ]))
}

impl ParquetWriter {
    pub fn to_path(path: &Path) -> Result<Self> {
        let (staged, file) = StagedFile::create(path)?;
        let schema = arrow_schema();
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), None)
            .map_err(|e| Error::write(staged.target(), e))?;
        Ok(Self {
            staged,
            schema,
            writer,
        })
    }

    fn to_record_batch(&self, records: &[MovieRecord]) -> Result<RecordBatch> {
        let n = records.len();
        let mut tconst = StringBuilder::with_capacity(n, n * 10);
        let mut title = StringBuilder::with_capacity(n, n * 16);
        let mut adult = BooleanBuilder::with_capacity(n);
        let mut year = Int32Builder::with_capacity(n);
        let mut runtime = Int32Builder::with_capacity(n);
        let mut genres = ListBuilder::new(StringBuilder::new());
        let mut rating = Float64Builder::with_capacity(n);
        let mut votes = Int64Builder::with_capacity(n);
        let mut director = StringBuilder::with_capacity(n, n * 16);
        let mut actors = ListBuilder::new(StringBuilder::new());

        for r in records {
            tconst.append_value(&r.tconst);
            title.append_option(r.primary_title.as_deref());
            adult.append_option(r.is_adult);
            year.append_value(r.start_year);
            runtime.append_value(r.runtime_minutes);
            for g in &r.genres {
                genres.values().append_value(g);
            }
            genres.append(true);
            rating.append_value(r.average_rating);
            votes.append_value(r.num_votes);
            director.append_option(r.director_name.as_deref());
            for a in &r.actors {
                actors.values().append_option(a.as_deref());
            }
            actors.append(true);
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(tconst.finish()),
            Arc::new(title.finish()),
            Arc::new(adult.finish()),
            Arc::new(year.finish()),
            Arc::new(runtime.finish()),
            Arc::new(genres.finish()),
            Arc::new(rating.finish()),
            Arc::new(votes.finish()),
            Arc::new(director.finish()),
            Arc::new(actors.finish()),
        ];
        RecordBatch::try_new(Arc::clone(&self.schema), columns)
            .map_err(|e| Error::write(self.staged.target(), e))
    }
}

impl RecordSink for ParquetWriter {
    fn write_batch(&mut self, records: &[MovieRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let batch = self.to_record_batch(records)?;
        self.writer
            .write(&batch)
            .map_err(|e| Error::write(self.staged.target(), e))
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        let ParquetWriter { staged, writer, .. } = *self;
        writer
            .close()
            .map_err(|e| Error::write(staged.target(), e))?;
        staged.publish()
    }
}
