//! CSV writer. List columns are joined with `,` inside one quoted cell; a
//! missing cast name is written as an empty element.

use std::fs::File;
use std::path::{Path, PathBuf};

use cinefold_core::model::MovieRecord;

use super::{RecordSink, StagedFile};
use crate::error::{Error, Result};

pub struct CsvWriter {
    staged: StagedFile,
    writer: csv::Writer<File>,
}

impl CsvWriter {
    pub fn to_path(path: &Path) -> Result<Self> {
        let (staged, file) = StagedFile::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(MovieRecord::COLUMNS)
            .map_err(|e| Error::write(staged.target(), e))?;
        Ok(Self { staged, writer })
    }
}

impl RecordSink for CsvWriter {
    fn write_batch(&mut self, records: &[MovieRecord]) -> Result<()> {
        for r in records {
            let actors: Vec<&str> = r.actors.iter().map(|a| a.as_deref().unwrap_or("")).collect();
            let row = [
                r.tconst.clone(),
                r.primary_title.clone().unwrap_or_default(),
                r.is_adult.map(|b| (b as u8).to_string()).unwrap_or_default(),
                r.start_year.to_string(),
                r.runtime_minutes.to_string(),
                r.genres.join(","),
                r.average_rating.to_string(),
                r.num_votes.to_string(),
                r.director_name.clone().unwrap_or_default(),
                actors.join(","),
            ];
            self.writer
                .write_record(&row)
                .map_err(|e| Error::write(self.staged.target(), e))?;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        let CsvWriter { staged, writer } = *self;
        let file = writer
            .into_inner()
            .map_err(|e| Error::write(staged.target(), e.error()))?;
        file.sync_all()
            .map_err(|e| Error::write(staged.target(), e))?;
        drop(file);
        staged.publish()
    }
}
