//! MemoryBudget + RAII guard implementations.
//!
//! Dropping a guard returns its bytes to the budget (panic-safe).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cinefold_core::budget::{BudgetGuard, MemoryBudget};

use crate::error::{Error, Result};

struct BudgetInner {
    capacity: usize,
    used: AtomicUsize,
}

impl BudgetInner {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: AtomicUsize::new(0),
        }
    }

    fn try_acquire(&self, bytes: usize) -> bool {
        loop {
            let cur = self.used.load(Ordering::Relaxed);
            let next = cur.saturating_add(bytes);
            if next > self.capacity {
                return false;
            }
            if self
                .used
                .compare_exchange(cur, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Concrete MemoryBudget used by the pipeline.
#[derive(Clone)]
pub struct MemoryBudgetImpl {
    inner: Arc<BudgetInner>,
}

impl MemoryBudgetImpl {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Arc::new(BudgetInner::new(capacity_bytes)),
        }
    }

    /// Acquire an empty guard that can grow later.
    pub fn empty_guard(&self, tag: &'static str) -> BudgetGuardImpl {
        BudgetGuardImpl {
            inner: Arc::clone(&self.inner),
            bytes: 0,
            tag,
        }
    }
}

/// RAII guard that accounts for a number of bytes.
pub struct BudgetGuardImpl {
    inner: Arc<BudgetInner>,
    bytes: usize,
    tag: &'static str,
}

impl Drop for BudgetGuardImpl {
    fn drop(&mut self) {
        if self.bytes > 0 {
            self.inner.release(self.bytes);
            self.bytes = 0;
        }
    }
}

impl BudgetGuard for BudgetGuardImpl {
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn tag(&self) -> &'static str {
        self.tag
    }
}

impl BudgetGuardImpl {
    /// Try to resize this guard to a new byte count.
    /// Shrinking always succeeds.
    pub fn try_resize(&mut self, new_bytes: usize) -> bool {
        if new_bytes == self.bytes {
            return true;
        }

        if new_bytes < self.bytes {
            let delta = self.bytes - new_bytes;
            self.inner.release(delta);
            self.bytes = new_bytes;
            true
        } else {
            let delta = new_bytes - self.bytes;
            if self.inner.try_acquire(delta) {
                self.bytes = new_bytes;
                true
            } else {
                false
            }
        }
    }

    /// Grow by `delta` bytes or report which cap was hit.
    pub fn grow(&mut self, delta: usize) -> Result<()> {
        let target = self.bytes.saturating_add(delta);
        if self.try_resize(target) {
            Ok(())
        } else {
            Err(Error::BudgetExceeded {
                tag: self.tag,
                requested: delta,
                capacity: self.inner.capacity,
                used: self.inner.used.load(Ordering::Relaxed),
            })
        }
    }
}

impl MemoryBudget for MemoryBudgetImpl {
    type Guard = BudgetGuardImpl;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard> {
        if bytes == 0 || self.inner.try_acquire(bytes) {
            Some(BudgetGuardImpl {
                inner: Arc::clone(&self.inner),
                bytes,
                tag,
            })
        } else {
            None
        }
    }

    fn capacity_bytes(&self) -> usize {
        self.inner.capacity
    }

    fn used_bytes(&self) -> usize {
        self.inner.used.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_returns_bytes_on_drop() {
        let budget = MemoryBudgetImpl::new(1024);
        let g = budget.try_acquire(600, "test").expect("fits");
        assert_eq!(budget.used_bytes(), 600);
        assert!(budget.try_acquire(600, "test").is_none());
        drop(g);
        assert_eq!(budget.used_bytes(), 0);
    }

    #[test]
    fn grow_reports_the_cap() {
        let budget = MemoryBudgetImpl::new(100);
        let mut g = budget.empty_guard("cast_buffer");
        g.grow(60).unwrap();
        g.grow(40).unwrap();
        let err = g.grow(1).unwrap_err();
        assert!(err.to_string().contains("cast_buffer"));
        assert_eq!(g.bytes(), 100);
        assert!(g.try_resize(10));
        assert_eq!(budget.used_bytes(), 10);
    }
}
