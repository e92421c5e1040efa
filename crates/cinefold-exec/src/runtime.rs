//! Pipeline runtime.
//!
//! Stage order:
//! 1. load names, titles, ratings, crew (load or stream per source size)
//! 2. key-set planning: inner joins, working set, director names
//! 3. stream principals into the cast aggregator
//! 4. assemble records
//! 5. write through a staged sink
//!
//! Configuration is validated in `Pipeline::new`, before any file is opened.
//! Any structural failure aborts the run; the staged sink guarantees that no
//! partial output file is left behind.

use std::time::{SystemTime, UNIX_EPOCH};

use cinefold_core::hash::digest_records;
use cinefold_core::prelude::*;
use cinefold_io::open_sink;
use cinefold_mem::MemoryBudgetImpl;
use cinefold_operators::{assemble, CastAggregator, HashIndex, RowSink, TableNormalizer, TableSpec};
use cinefold_planner::{choose_strategy, KeySetPlanner};

use crate::producer::{Producer, TableProducer};

/// Records handed to the sink per `write_batch` call.
const WRITE_BATCH: usize = 8192;

pub struct Pipeline {
    cfg: PipelineConfig,
    budget: MemoryBudgetImpl,
}

/// Everything the pipeline computes before persistence.
#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<MovieRecord>,
    pub report: RunReport,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Result<Self> {
        cfg.validate()?;
        let budget = MemoryBudgetImpl::new(cfg.mem_cap_bytes);
        Ok(Self { cfg, budget })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Run every stage except the write. The report carries the digest of
    /// the returned records.
    pub fn build_records(&self, observer: &dyn PipelineObserver) -> Result<PipelineOutput> {
        let mut report = RunReport::new(now_ms());

        let names = HashIndex::build(self.load_table::<Person>(observer, &mut report)?);
        let titles = self.load_table::<Title>(observer, &mut report)?;
        let ratings = self.load_table::<Rating>(observer, &mut report)?;
        let crew = self.load_table::<CrewAssignment>(observer, &mut report)?;

        let plan = KeySetPlanner::new(observer).plan(titles, ratings, crew, &names);
        for (&table, &count) in &plan.stats.duplicates {
            report.tables.entry(table).or_default().duplicates += count;
        }
        report.working_set_size = plan.working_set.len();

        observer.stage_started(Stage::AggregateCast);
        let mut cast = CastAggregator::new(plan.working_set.clone(), &self.cfg.policy, &self.budget);
        let stats = self.produce::<PrincipalRole, _>(&mut cast, observer)?;
        report.record_table(TableKind::Principals, &stats);
        report.retained_cast_rows = cast.retained_rows();
        report.peak_cast_bytes = cast.peak_bytes();
        let cast = cast.finish(&names);
        observer.stage_finished(Stage::AggregateCast, cast.len());

        observer.stage_started(Stage::Assemble);
        let records = assemble(plan.movies, &cast);
        observer.stage_finished(Stage::Assemble, records.len());

        report.records = records.len();
        report.output_digest = Some(digest_records(&records)?);
        Ok(PipelineOutput { records, report })
    }

    /// Full run: build, then write to the configured output.
    pub fn run(&self, observer: &dyn PipelineObserver) -> Result<RunReport> {
        let PipelineOutput { records, mut report } = self.build_records(observer)?;

        observer.stage_started(Stage::Write);
        let mut sink = open_sink(self.cfg.format, &self.cfg.output_path())?;
        for batch in records.chunks(WRITE_BATCH) {
            sink.write_batch(batch)?;
        }
        let written = sink.finish()?;
        observer.stage_finished(Stage::Write, records.len());

        report.output_path = Some(written.display().to_string());
        let report = report.finish(now_ms());
        #[cfg(feature = "tracing")]
        tracing::info!(
            records = report.records,
            output = %written.display(),
            duration_ms = report.duration_ms(),
            "run complete"
        );
        Ok(report)
    }

    fn load_table<T: TableSpec>(
        &self,
        observer: &dyn PipelineObserver,
        report: &mut RunReport,
    ) -> Result<Vec<T>> {
        observer.stage_started(Stage::Load(T::KIND));
        let mut rows = Vec::new();
        let stats = self.produce::<T, _>(&mut rows, observer)?;
        report.record_table(T::KIND, &stats);
        observer.stage_finished(Stage::Load(T::KIND), rows.len());
        Ok(rows)
    }

    fn produce<T, S>(&self, sink: &mut S, observer: &dyn PipelineObserver) -> Result<TableStats>
    where
        T: TableSpec,
        S: RowSink<T>,
    {
        let path = self.cfg.source_path(T::KIND);
        let bytes = std::fs::metadata(&path).ok().map(|m| m.len());
        let strategy = choose_strategy(T::KIND, bytes, &self.cfg);
        let normalizer = TableNormalizer::<T>::new(&self.cfg.policy);
        Producer::for_strategy(strategy, &self.cfg).produce(&path, &normalizer, sink, observer)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
