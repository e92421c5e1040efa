//! Typed table producers.
//!
//! A producer opens one source, normalizes it, and hands typed rows to a
//! `RowSink` in file order. `Load` materializes the whole projected file as
//! one batch. `Stream` reads fixed-size chunks through a `ChunkFeed` and hands
//! each chunk over as soon as it is normalized, so only a chunk or two of raw
//! rows is ever resident.

use std::path::Path;

use cinefold_core::config::PipelineConfig;
use cinefold_core::error::{Error, Result};
use cinefold_core::observe::PipelineObserver;
use cinefold_core::report::TableStats;
use cinefold_core::types::RowBatch;
use cinefold_io::{DelimitedSource, SourceOptions};
use cinefold_operators::{RowSink, TableNormalizer, TableSpec};
use cinefold_planner::LoadStrategy;

use crate::scheduler::ChunkFeed;

pub trait TableProducer {
    fn produce<T, S>(
        &self,
        path: &Path,
        normalizer: &TableNormalizer<T>,
        sink: &mut S,
        observer: &dyn PipelineObserver,
    ) -> Result<TableStats>
    where
        T: TableSpec,
        S: RowSink<T>;
}

#[derive(Debug, Clone)]
pub enum Producer {
    Load { opts: SourceOptions },
    Stream { opts: SourceOptions, chunk_rows: usize, prefetch: usize },
}

impl Producer {
    pub fn for_strategy(strategy: LoadStrategy, cfg: &PipelineConfig) -> Self {
        let opts = SourceOptions::from_config(cfg);
        match strategy {
            LoadStrategy::Load => Producer::Load { opts },
            LoadStrategy::Stream { chunk_rows } => Producer::Stream {
                opts,
                chunk_rows,
                prefetch: cfg.prefetch_chunks,
            },
        }
    }

    fn options(&self) -> &SourceOptions {
        match self {
            Producer::Load { opts } | Producer::Stream { opts, .. } => opts,
        }
    }
}

impl TableProducer for Producer {
    fn produce<T, S>(
        &self,
        path: &Path,
        normalizer: &TableNormalizer<T>,
        sink: &mut S,
        observer: &dyn PipelineObserver,
    ) -> Result<TableStats>
    where
        T: TableSpec,
        S: RowSink<T>,
    {
        let opts = self
            .options()
            .clone()
            .with_projection(normalizer.projection())
            .with_optional(normalizer.optional());
        let mut source = DelimitedSource::open(path, &opts)?;

        let mut stats = TableStats::default();
        match self {
            Producer::Load { .. } => {
                let mut all = RowBatch::with_columns(source.columns());
                while let Some(batch) = source.next_batch(usize::MAX)? {
                    all.append(&batch).map_err(Error::Invariant)?;
                }
                stats.merge(&fold_batch(&all, normalizer, sink)?);
            }
            Producer::Stream {
                chunk_rows,
                prefetch,
                ..
            } => {
                let feed = ChunkFeed::new(source, *chunk_rows, *prefetch)
                    .map_err(|e| Error::Invariant(format!("cannot start reader thread: {e}")))?;
                for (index, chunk) in feed.enumerate() {
                    let chunk = chunk?;
                    let chunk_stats = fold_batch(&chunk, normalizer, sink)?;
                    observer.chunk_consumed(T::KIND, index, chunk_stats.rows_read, chunk_stats.rows_kept);
                    stats.merge(&chunk_stats);
                }
            }
        }

        if stats.rejected.total() > 0 {
            observer.rows_rejected(T::KIND, &stats.rejected);
        }
        Ok(stats)
    }
}

/// Normalize one batch and hand the typed rows to `sink`. Rows the sink
/// declines count as filtered.
fn fold_batch<T, S>(batch: &RowBatch, normalizer: &TableNormalizer<T>, sink: &mut S) -> Result<TableStats>
where
    T: TableSpec,
    S: RowSink<T>,
{
    let mut rows = Vec::new();
    let mut stats = normalizer.normalize_batch(batch, &mut rows)?;
    let offered = rows.len();
    let accepted = sink.accept(rows)?;
    stats.rows_filtered += offered - accepted;
    stats.rows_kept = accepted;
    Ok(stats)
}
