#![forbid(unsafe_code)]
//! cinefold-planner: everything decided before the principals stream starts.
//!
//! - `keyset`: the mandatory inner joins, the director-name left join, and the
//!   working identifier set handed to the cast aggregator.
//! - `strategy`: load-whole vs. stream-in-chunks per source.
//! - `explain`: a serializable description of a configured run.
//! - `dsl::yaml`: YAML configuration layer.

pub mod dsl;
pub mod error;
pub mod explain;
pub mod keyset;
pub mod strategy;

pub use dsl::yaml::{load_config_file, parse_config_yaml};
pub use error::PlanError;
pub use explain::{JoinStep, PipelinePlan, SourcePlan};
pub use keyset::{KeySetPlan, KeySetPlanner, KeySetStats};
pub use strategy::{choose_strategy, LoadStrategy};
