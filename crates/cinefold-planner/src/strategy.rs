//! Per-source load strategy.
//!
//! Small sources are loaded whole and normalized in one pass. Sources above
//! the configured byte threshold are read in fixed-size chunks and folded as
//! they arrive. The principals source always streams, since the cast fold
//! only keeps rows for movies in the working set.

use serde::Serialize;

use cinefold_core::config::PipelineConfig;
use cinefold_core::observe::TableKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum LoadStrategy {
    Load,
    Stream { chunk_rows: usize },
}

/// `source_bytes` is `None` when the size is unknown; such sources load.
pub fn choose_strategy(table: TableKind, source_bytes: Option<u64>, cfg: &PipelineConfig) -> LoadStrategy {
    let stream = LoadStrategy::Stream {
        chunk_rows: cfg.chunk_rows,
    };
    if table == TableKind::Principals {
        return stream;
    }
    match source_bytes {
        Some(n) if n > cfg.stream_threshold_bytes => stream,
        _ => LoadStrategy::Load,
    }
}
