//! Convenient re-exports for downstream crates.

pub use crate::config::{PipelineConfig, SourceFiles};
pub use crate::error::{Error, Result};
pub use crate::keys::WorkingSet;
pub use crate::model::{
    CrewAssignment, MovieRecord, Person, PlannedMovie, PrincipalRole, Rating, Title,
};
pub use crate::observe::{NoopObserver, PipelineObserver, Stage, TableKind};
pub use crate::policy::{EnrichmentPolicy, MissingDirector};
pub use crate::report::{RejectStats, RunReport, TableStats};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::types::{Column, RowBatch, Scalar};
