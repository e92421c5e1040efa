//! Observer implementations.
//!
//! `TracingObserver` forwards pipeline events to `tracing`; the binary installs
//! the subscriber. `RecordingObserver` keeps events in memory for tests and
//! for callers that want to inspect a run programmatically.

use std::sync::Mutex;

use cinefold_core::observe::{PipelineObserver, Stage, TableKind};
use cinefold_core::report::RejectStats;

#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[cfg(feature = "tracing")]
impl PipelineObserver for TracingObserver {
    fn stage_started(&self, stage: Stage) {
        tracing::info!(%stage, "stage started");
    }

    fn stage_finished(&self, stage: Stage, rows_out: usize) {
        tracing::info!(%stage, rows_out, "stage finished");
    }

    fn chunk_consumed(&self, table: TableKind, chunk_index: usize, rows_in: usize, rows_kept: usize) {
        tracing::debug!(%table, chunk_index, rows_in, rows_kept, "chunk consumed");
    }

    fn rows_rejected(&self, table: TableKind, rejected: &RejectStats) {
        tracing::info!(
            %table,
            missing_required = rejected.missing_required,
            bad_numeric = rejected.bad_numeric,
            missing_director = rejected.missing_director,
            "rows rejected"
        );
    }

    fn duplicates_dropped(&self, table: TableKind, count: usize) {
        tracing::warn!(%table, count, "duplicate keys dropped");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(Stage),
    Finished(Stage, usize),
    Chunk {
        table: TableKind,
        index: usize,
        rows_in: usize,
        rows_kept: usize,
    },
    Rejected(TableKind, RejectStats),
    Duplicates(TableKind, usize),
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of chunk events seen for `table`.
    pub fn chunks(&self, table: TableKind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Chunk { table: t, .. } if *t == table))
            .count()
    }

    fn push(&self, e: Event) {
        match self.events.lock() {
            Ok(mut g) => g.push(e),
            Err(poisoned) => poisoned.into_inner().push(e),
        }
    }
}

impl PipelineObserver for RecordingObserver {
    fn stage_started(&self, stage: Stage) {
        self.push(Event::Started(stage));
    }

    fn stage_finished(&self, stage: Stage, rows_out: usize) {
        self.push(Event::Finished(stage, rows_out));
    }

    fn chunk_consumed(&self, table: TableKind, index: usize, rows_in: usize, rows_kept: usize) {
        self.push(Event::Chunk {
            table,
            index,
            rows_in,
            rows_kept,
        });
    }

    fn rows_rejected(&self, table: TableKind, rejected: &RejectStats) {
        self.push(Event::Rejected(table, *rejected));
    }

    fn duplicates_dropped(&self, table: TableKind, count: usize) {
        self.push(Event::Duplicates(table, count));
    }
}
