#![forbid(unsafe_code)]
//! cinefold-operators: the row-level transforms of the pipeline.
//!
//! - `normalize`: per-table projection, coercion, and fail-soft row rejection.
//! - `tables`: the column policy of each source table.
//! - `join`: key-deduplicating hash joins.
//! - `cast`: the streaming top-N cast aggregator.
//! - `assemble`: the terminal left join producing `MovieRecord`s.
//!
//! Everything here is synchronous and deterministic; threading lives in
//! `cinefold-exec`.

pub mod assemble;
pub mod cast;
pub mod join;
pub mod normalize;
pub mod tables;
pub mod traits;

pub use assemble::assemble;
pub use cast::{CastAggregate, CastAggregator};
pub use join::hash::{inner_join, left_join, HashIndex, JoinType};
pub use join::{dedup_by_key, Keyed};
pub use normalize::{ColumnPolicy, Outcome, Rejection, TableNormalizer, TableSpec};
pub use traits::{OpError, RowSink};
