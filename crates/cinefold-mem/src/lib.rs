#![forbid(unsafe_code)]
//! cinefold-mem: hard memory budget and RAII guards.
//!
//! Concrete implementations of the `cinefold-core::budget` interfaces. The
//! streaming cast aggregator grows a single guard as its retained buffer grows,
//! so the configured cap is enforced on the only state that scales with input.

pub mod error;
pub mod guard;
pub mod tracking;

pub use guard::{BudgetGuardImpl, MemoryBudgetImpl};
pub use tracking::PeakTracker;
