//! Streaming NDJSON writer: one `MovieRecord` object per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cinefold_core::model::MovieRecord;

use super::{RecordSink, StagedFile};
use crate::error::{Error, Result};

pub struct JsonlWriter {
    staged: StagedFile,
    writer: BufWriter<File>,
}

impl JsonlWriter {
    pub fn to_path(path: &Path) -> Result<Self> {
        let (staged, file) = StagedFile::create(path)?;
        Ok(Self {
            staged,
            writer: BufWriter::new(file),
        })
    }
}

impl RecordSink for JsonlWriter {
    fn write_batch(&mut self, records: &[MovieRecord]) -> Result<()> {
        for r in records {
            serde_json::to_writer(&mut self.writer, &JsonRow::from(r))
                .map_err(|e| Error::write(self.staged.target(), e))?;
            self.writer
                .write_all(b"\n")
                .map_err(|e| Error::write(self.staged.target(), e))?;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        let JsonlWriter { staged, writer } = *self;
        let file = writer
            .into_inner()
            .map_err(|e| Error::write(staged.target(), e.error()))?;
        file.sync_all()
            .map_err(|e| Error::write(staged.target(), e))?;
        drop(file);
        staged.publish()
    }
}

/// Column names on the wire follow the source files' camelCase headers.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRow<'a> {
    tconst: &'a str,
    primary_title: Option<&'a str>,
    is_adult: Option<bool>,
    start_year: i32,
    runtime_minutes: i32,
    genres: &'a [String],
    average_rating: f64,
    num_votes: i64,
    director_name: Option<&'a str>,
    actors: &'a [Option<String>],
}

impl<'a> From<&'a MovieRecord> for JsonRow<'a> {
    fn from(r: &'a MovieRecord) -> Self {
        Self {
            tconst: &r.tconst,
            primary_title: r.primary_title.as_deref(),
            is_adult: r.is_adult,
            start_year: r.start_year,
            runtime_minutes: r.runtime_minutes,
            genres: &r.genres,
            average_rating: r.average_rating,
            num_votes: r.num_votes,
            director_name: r.director_name.as_deref(),
            actors: &r.actors,
        }
    }
}
