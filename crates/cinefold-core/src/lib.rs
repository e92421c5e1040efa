#![forbid(unsafe_code)]
//! cinefold-core: shared vocabulary for the movie denormalization pipeline.
//!
//! Pure data and small helpers only. Readers live in `cinefold-io`, transforms in
//! `cinefold-operators`, join planning in `cinefold-planner`, and the runtime in
//! `cinefold-exec`.

pub mod budget;
pub mod config;
pub mod error;
pub mod hash;
pub mod keys;
pub mod model;
pub mod observe;
pub mod policy;
pub mod prelude;
pub mod report;
pub mod schema;
pub mod types;

/// Crate version stamped into run reports.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
