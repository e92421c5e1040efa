//! Serializable description of a configured run, printed by `cinefold explain`.

use std::path::Path;

use serde::Serialize;

use cinefold_core::config::{OutputFormat, PipelineConfig};
use cinefold_core::model::{CrewAssignment, Person, PrincipalRole, Rating, Title};
use cinefold_core::observe::TableKind;
use cinefold_core::policy::EnrichmentPolicy;
use cinefold_operators::{ColumnPolicy, JoinType, TableSpec};

use crate::strategy::{choose_strategy, LoadStrategy};

#[derive(Debug, Clone, Serialize)]
pub struct SourcePlan {
    pub table: TableKind,
    pub path: String,
    /// `None` when the file could not be inspected.
    pub bytes: Option<u64>,
    pub strategy: LoadStrategy,
    pub columns: Vec<String>,
    /// Read only when the header has them.
    pub optional: Vec<String>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinStep {
    pub left: String,
    pub right: TableKind,
    pub on: String,
    #[serde(serialize_with = "join_type_name")]
    pub join_type: JoinType,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelinePlan {
    pub sources: Vec<SourcePlan>,
    pub joins: Vec<JoinStep>,
    pub policy: EnrichmentPolicy,
    pub chunk_rows: usize,
    pub prefetch_chunks: usize,
    pub mem_cap_bytes: usize,
    pub output: String,
    pub format: OutputFormat,
}

impl PipelinePlan {
    /// Describe `cfg` using file sizes from disk.
    pub fn build(cfg: &PipelineConfig) -> Self {
        Self::build_with(cfg, |p| std::fs::metadata(p).ok().map(|m| m.len()))
    }

    pub fn build_with<F>(cfg: &PipelineConfig, size_of: F) -> Self
    where
        F: Fn(&Path) -> Option<u64>,
    {
        let sources = TableKind::ALL
            .iter()
            .map(|&table| {
                let path = cfg.source_path(table);
                let bytes = size_of(&path);
                let policy = column_policy(table);
                SourcePlan {
                    table,
                    path: path.display().to_string(),
                    bytes,
                    strategy: choose_strategy(table, bytes, cfg),
                    columns: names(policy.read),
                    optional: names(policy.optional),
                    required: names(policy.required),
                }
            })
            .collect();

        Self {
            sources,
            joins: join_steps(),
            policy: cfg.policy.clone(),
            chunk_rows: cfg.chunk_rows,
            prefetch_chunks: cfg.prefetch_chunks,
            mem_cap_bytes: cfg.mem_cap_bytes,
            output: cfg.output_path().display().to_string(),
            format: cfg.format,
        }
    }
}

fn column_policy(table: TableKind) -> &'static ColumnPolicy {
    match table {
        TableKind::Titles => Title::policy(),
        TableKind::Ratings => Rating::policy(),
        TableKind::Crew => CrewAssignment::policy(),
        TableKind::Names => Person::policy(),
        TableKind::Principals => PrincipalRole::policy(),
    }
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

fn join_steps() -> Vec<JoinStep> {
    let step = |left: &str, right: TableKind, on: &str, join_type: JoinType| JoinStep {
        left: left.to_string(),
        right,
        on: on.to_string(),
        join_type,
    };
    vec![
        step("titles", TableKind::Ratings, "tconst", JoinType::Inner),
        step("movies_with_ratings", TableKind::Crew, "tconst", JoinType::Inner),
        step("movies_with_director_id", TableKind::Names, "director = nconst", JoinType::Left),
        step("movies_with_director_name", TableKind::Principals, "tconst (cast aggregate)", JoinType::Left),
    ]
}

fn join_type_name<S: serde::Serializer>(t: &JoinType, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(match t {
        JoinType::Inner => "inner",
        JoinType::Left => "left",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_every_source() {
        let mut cfg = PipelineConfig::new("/data");
        cfg.stream_threshold_bytes = 1000;
        let plan = PipelinePlan::build_with(&cfg, |p| {
            if p.ends_with("name.basics.tsv") {
                Some(5000)
            } else {
                Some(10)
            }
        });
        assert_eq!(plan.sources.len(), 5);
        let names = plan.sources.iter().find(|s| s.table == TableKind::Names).unwrap();
        assert!(matches!(names.strategy, LoadStrategy::Stream { .. }));
        let titles = &plan.sources[0];
        assert_eq!(titles.strategy, LoadStrategy::Load);
        assert!(titles.columns.contains(&"titleType".to_string()));
        assert!(!titles.columns.contains(&"primaryTitle".to_string()));
        assert_eq!(titles.optional, vec!["primaryTitle", "isAdult"]);
        assert_eq!(plan.output, "/data/cleaned_imdb_movies_batch.jsonl");

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["joins"][0]["join_type"], "inner");
        assert_eq!(json["joins"][2]["join_type"], "left");
    }
}
