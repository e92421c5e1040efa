use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad header in '{}': {message}", path.display())]
    Header { path: PathBuf, message: String },

    #[error("malformed record in '{}' near line {line}: {source}", path.display())]
    Record {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("cannot write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("unsupported output format: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Write {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl From<Error> for cinefold_core::error::Error {
    fn from(e: Error) -> Self {
        use cinefold_core::error::Error as CoreError;
        match &e {
            Error::Open { path, .. } | Error::Header { path, .. } | Error::Record { path, .. } => {
                CoreError::source_at(path, &e)
            }
            Error::Write { .. } | Error::Unsupported(_) => CoreError::Sink(e.to_string()),
        }
    }
}
