//! Abstract memory budget interfaces.
//!
//! The concrete implementation lives in `cinefold-mem`. Only traits live here so
//! operators can depend on the API without the accounting logic.

/// A guard returned by a memory budget when bytes are acquired.
///
/// Must be RAII (releases on Drop) and `Send`.
pub trait BudgetGuard: Send {
    /// Number of bytes currently accounted for by this guard.
    fn bytes(&self) -> usize;
    /// Debug tag for tracing.
    fn tag(&self) -> &'static str {
        "guard"
    }
}

/// A handle representing a memory-cap enforcer.
///
/// Callers `try_acquire` before growing a retained buffer. `None` means the
/// cap would be exceeded.
pub trait MemoryBudget: Send + Sync + 'static {
    type Guard: BudgetGuard;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard>;

    fn capacity_bytes(&self) -> usize;

    /// Approximate currently used bytes (advisory; not a correctness API).
    fn used_bytes(&self) -> usize;
}
