//! Operator error type and the typed row sink interface.
//!
//! Producers in `cinefold-exec` normalize each chunk of a source and hand the
//! typed rows to a `RowSink` in source order. Small tables collect into a
//! `Vec`; the principals table folds into the cast aggregator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    /// A batch lacks a column the table policy reads. Structural, fatal.
    #[error("schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Budget(#[from] cinefold_mem::error::Error),
}

impl From<OpError> for cinefold_core::error::Error {
    fn from(e: OpError) -> Self {
        use cinefold_core::error::Error as CoreError;
        match e {
            OpError::Schema(m) => CoreError::Schema(m),
            OpError::Budget(b) => b.into(),
        }
    }
}

pub trait RowSink<T> {
    /// Accept one normalized chunk. Returns how many rows were retained; the
    /// rest were filtered out by the sink's own domain rules.
    fn accept(&mut self, rows: Vec<T>) -> Result<usize, OpError>;
}

impl<T> RowSink<T> for Vec<T> {
    fn accept(&mut self, rows: Vec<T>) -> Result<usize, OpError> {
        let n = rows.len();
        self.extend(rows);
        Ok(n)
    }
}
