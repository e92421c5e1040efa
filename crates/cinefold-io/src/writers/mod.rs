//! Record sinks for the final `MovieRecord` collection.
//!
//! Every sink writes into a staging file next to the destination and renames
//! it into place on `finish`. A sink dropped without `finish` removes its
//! staging file, so a failed run never leaves a truncated output behind.

pub mod csv;
pub mod jsonl;

#[cfg(feature = "parquet")]
pub mod parquet;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use cinefold_core::config::OutputFormat;
use cinefold_core::model::MovieRecord;

use crate::error::{Error, Result};

pub trait RecordSink {
    fn write_batch(&mut self, records: &[MovieRecord]) -> Result<()>;

    /// Flush and publish the output. Consumes the sink.
    fn finish(self: Box<Self>) -> Result<PathBuf>;
}

/// Open a sink for `format` at `path`.
pub fn open_sink(format: OutputFormat, path: &Path) -> Result<Box<dyn RecordSink>> {
    match format {
        OutputFormat::Jsonl => Ok(Box::new(jsonl::JsonlWriter::to_path(path)?)),
        OutputFormat::Csv => Ok(Box::new(csv::CsvWriter::to_path(path)?)),
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => Ok(Box::new(parquet::ParquetWriter::to_path(path)?)),
        #[cfg(not(feature = "parquet"))]
        OutputFormat::Parquet => Err(Error::Unsupported(
            "parquet output requires the `parquet` feature".into(),
        )),
    }
}

/// A destination file that only appears once `publish` succeeds.
pub struct StagedFile {
    target: PathBuf,
    staging: PathBuf,
    published: bool,
}

impl StagedFile {
    pub fn create(target: &Path) -> Result<(Self, File)> {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
            }
        }
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| Error::write(target, "output path has no file name"))?;
        name.push(".partial");
        let staging = target.with_file_name(name);
        let file = File::create(&staging).map_err(|e| Error::write(&staging, e))?;
        Ok((
            Self {
                target: target.to_path_buf(),
                staging,
                published: false,
            },
            file,
        ))
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn publish(mut self) -> Result<PathBuf> {
        fs::rename(&self.staging, &self.target).map_err(|e| Error::write(&self.target, e))?;
        self.published = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.published {
            let _ = fs::remove_file(&self.staging);
        }
    }
}
