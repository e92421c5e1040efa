#![forbid(unsafe_code)]
//! cinefold-io: delimited record sources and record sinks.
//!
//! Sources yield raw `RowBatch` chunks (strings or nulls only) with a bounded
//! read buffer; sinks persist the final `MovieRecord` collection and only make
//! the output visible once it has been written completely.

pub mod buf;
pub mod error;
pub mod readers;
pub mod writers;

pub use readers::delimited::{Chunks, DelimitedSource, RawRow, Rows, SourceOptions};
pub use writers::{open_sink, RecordSink};
