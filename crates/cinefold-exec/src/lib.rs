#![forbid(unsafe_code)]
//! cinefold-exec: runs the pipeline end to end.
//!
//! Stages run in order on the calling thread: load the four small tables,
//! plan the key set, stream principals into the cast aggregator, assemble,
//! write. The only concurrency is the reader thread that prefetches
//! principals chunks while the previous chunk is being folded.

pub mod metrics;
pub mod producer;
pub mod runtime;
pub mod scheduler;

pub use metrics::RecordingObserver;
#[cfg(feature = "tracing")]
pub use metrics::TracingObserver;
pub use producer::{Producer, TableProducer};
pub use runtime::{Pipeline, PipelineOutput};
pub use scheduler::ChunkFeed;
