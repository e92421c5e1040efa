//! Streaming readers that produce `RowBatch` chunks.

pub mod delimited;
