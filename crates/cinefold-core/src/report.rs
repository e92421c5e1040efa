//! Run summary emitted after a successful pipeline run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::Hash256;
use crate::observe::TableKind;

/// Silent, counted row drops (`RowRejected`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectStats {
    /// A required column was null after null-marker substitution.
    pub missing_required: usize,
    /// A numeric column did not coerce.
    pub bad_numeric: usize,
    /// The director list had no entry at the configured position.
    pub missing_director: usize,
}

impl RejectStats {
    pub fn total(&self) -> usize {
        self.missing_required + self.bad_numeric + self.missing_director
    }

    pub fn merge(&mut self, other: &RejectStats) {
        self.missing_required += other.missing_required;
        self.bad_numeric += other.bad_numeric;
        self.missing_director += other.missing_director;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub rows_read: usize,
    /// Rows dropped by a domain filter (title kind, cast category, working set).
    pub rows_filtered: usize,
    pub rejected: RejectStats,
    pub rows_kept: usize,
    pub chunks: usize,
    pub duplicates: usize,
}

impl TableStats {
    pub fn merge(&mut self, other: &TableStats) {
        self.rows_read += other.rows_read;
        self.rows_filtered += other.rows_filtered;
        self.rejected.merge(&other.rejected);
        self.rows_kept += other.rows_kept;
        self.chunks += other.chunks;
        self.duplicates += other.duplicates;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub id: Uuid,
    pub engine_version: String,
    pub tables: BTreeMap<TableKind, TableStats>,
    /// Size of the working identifier set handed to the cast aggregator.
    pub working_set_size: usize,
    /// Principal rows that survived category and membership filtering.
    pub retained_cast_rows: usize,
    /// Peak bytes accounted to the cast buffer.
    pub peak_cast_bytes: usize,
    pub records: usize,
    pub output_digest: Option<Hash256>,
    pub output_path: Option<String>,
    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl RunReport {
    pub fn new(started_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine_version: crate::VERSION.to_string(),
            tables: BTreeMap::new(),
            working_set_size: 0,
            retained_cast_rows: 0,
            peak_cast_bytes: 0,
            records: 0,
            output_digest: None,
            output_path: None,
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn table(&self, kind: TableKind) -> Option<&TableStats> {
        self.tables.get(&kind)
    }

    pub fn record_table(&mut self, kind: TableKind, stats: &TableStats) {
        self.tables.entry(kind).or_default().merge(stats);
    }

    pub fn finish(mut self, finished_ms: u64) -> Self {
        self.finished_ms = finished_ms;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}
