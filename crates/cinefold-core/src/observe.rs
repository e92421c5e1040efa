//! Injectable observability hooks.
//!
//! Every component receives a `&dyn PipelineObserver` instead of touching
//! process-wide logging state. `cinefold-exec` provides a `tracing`-backed
//! implementation; tests can record events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::RejectStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Titles,
    Ratings,
    Crew,
    Names,
    Principals,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::Titles,
        TableKind::Ratings,
        TableKind::Crew,
        TableKind::Names,
        TableKind::Principals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Titles => "titles",
            TableKind::Ratings => "ratings",
            TableKind::Crew => "crew",
            TableKind::Names => "names",
            TableKind::Principals => "principals",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load(TableKind),
    PlanKeySet,
    AggregateCast,
    Assemble,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load(t) => write!(f, "load:{t}"),
            Stage::PlanKeySet => f.write_str("plan_key_set"),
            Stage::AggregateCast => f.write_str("aggregate_cast"),
            Stage::Assemble => f.write_str("assemble"),
            Stage::Write => f.write_str("write"),
        }
    }
}

pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage, _rows_out: usize) {}

    /// One chunk of a streamed source was filtered and folded.
    fn chunk_consumed(&self, _table: TableKind, _chunk_index: usize, _rows_in: usize, _rows_kept: usize) {}

    fn rows_rejected(&self, _table: TableKind, _rejected: &RejectStats) {}

    /// Right-side duplicates discarded to prevent join fan-out.
    fn duplicates_dropped(&self, _table: TableKind, _count: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
