use std::fmt::Display;
use std::path::Path;

use thiserror::Error;

/// Canonical result for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal pipeline errors. Row-level rejections are not errors; see
/// `report::RejectStats`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// File cannot be opened, header cannot be parsed, or a chunk is malformed.
    #[error("Source error in '{path}': {message}")]
    Source { path: String, message: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Memory budget exceeded: {0}")]
    Budget(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub fn source_at(path: impl AsRef<Path>, message: impl Display) -> Self {
        Error::Source {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// True for errors raised before any I/O was attempted.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
