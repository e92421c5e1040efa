//! Streaming cast aggregation.
//!
//! Principal rows arrive in source order, one chunk at a time. Each row is
//! checked against the cast categories and the working set, then folded into a
//! bounded per-movie buffer holding the best `cast_limit` entries by billing
//! order. Ties on billing order keep arrival order, so the result equals a
//! stable sort of all matching rows followed by taking the first
//! `cast_limit`, independent of how the input was chunked.
//!
//! The buffer is the only state that grows with the principals table; its
//! size is charged to a budget guard and overflowing the cap is fatal.

use std::collections::HashMap;
use std::mem::size_of;

use serde::Serialize;

use cinefold_core::budget::BudgetGuard;
use cinefold_core::keys::WorkingSet;
use cinefold_core::model::{Person, PrincipalRole};
use cinefold_core::policy::EnrichmentPolicy;
use cinefold_mem::{BudgetGuardImpl, MemoryBudgetImpl, PeakTracker};

use crate::join::hash::HashIndex;
use crate::traits::{OpError, RowSink};

pub const CAST_BUFFER_TAG: &str = "cast_buffer";

#[derive(Debug, Clone)]
struct Slot {
    ordering: i64,
    seq: u64,
    nconst: String,
}

impl Slot {
    fn rank(&self) -> (i64, u64) {
        (self.ordering, self.seq)
    }

    fn footprint(&self) -> usize {
        size_of::<Slot>() + self.nconst.len()
    }
}

fn entry_footprint(tconst: &str) -> usize {
    size_of::<String>() + size_of::<Vec<Slot>>() + tconst.len()
}

pub struct CastAggregator {
    working_set: WorkingSet,
    policy: EnrichmentPolicy,
    limit: usize,
    slots: HashMap<String, Vec<Slot>>,
    seq: u64,
    matched: usize,
    guard: BudgetGuardImpl,
    peak: PeakTracker,
}

impl CastAggregator {
    pub fn new(working_set: WorkingSet, policy: &EnrichmentPolicy, budget: &MemoryBudgetImpl) -> Self {
        Self {
            working_set,
            policy: policy.clone(),
            limit: policy.cast_limit,
            slots: HashMap::new(),
            seq: 0,
            matched: 0,
            guard: budget.empty_guard(CAST_BUFFER_TAG),
            peak: PeakTracker::new(),
        }
    }

    /// Fold one principal row. Returns whether it passed the category and
    /// working-set filters.
    pub fn fold(&mut self, role: PrincipalRole) -> Result<bool, OpError> {
        if !self.policy.is_cast_category(&role.category) {
            return Ok(false);
        }
        if !self.working_set.contains(&role.tconst) {
            return Ok(false);
        }
        self.matched += 1;
        self.seq += 1;

        let slot = Slot {
            ordering: role.ordering,
            seq: self.seq,
            nconst: role.nconst,
        };

        if !self.slots.contains_key(&role.tconst) {
            self.guard.grow(entry_footprint(&role.tconst))?;
        }
        let slots = self.slots.entry(role.tconst).or_default();

        let rank = slot.rank();
        let pos = slots.partition_point(|s| s.rank() <= rank);
        if pos >= self.limit {
            return Ok(true);
        }

        self.guard.grow(slot.footprint())?;
        slots.insert(pos, slot);
        if slots.len() > self.limit {
            if let Some(evicted) = slots.pop() {
                let shrunk = self.guard.bytes().saturating_sub(evicted.footprint());
                self.guard.try_resize(shrunk);
            }
        }
        self.peak.record_used(self.guard.bytes());
        Ok(true)
    }

    /// Principal rows that passed the filters so far.
    pub fn retained_rows(&self) -> usize {
        self.matched
    }

    /// Movies with at least one buffered cast entry.
    pub fn movies(&self) -> usize {
        self.slots.len()
    }

    pub fn peak_bytes(&self) -> usize {
        self.peak.peak()
    }

    /// Resolve buffered person ids to names. Ids without a name row become
    /// `None` and keep their position.
    pub fn finish(self, names: &HashIndex<Person>) -> CastAggregate {
        let cast = self
            .slots
            .into_iter()
            .map(|(tconst, slots)| {
                let resolved = slots
                    .iter()
                    .map(|s| names.get(&s.nconst).map(|p| p.primary_name.clone()))
                    .collect();
                (tconst, resolved)
            })
            .collect();
        CastAggregate { cast }
    }
}

impl RowSink<PrincipalRole> for CastAggregator {
    fn accept(&mut self, rows: Vec<PrincipalRole>) -> Result<usize, OpError> {
        let mut kept = 0;
        for role in rows {
            if self.fold(role)? {
                kept += 1;
            }
        }
        Ok(kept)
    }
}

/// Final cast lists keyed by movie id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CastAggregate {
    cast: HashMap<String, Vec<Option<String>>>,
}

impl CastAggregate {
    pub fn get(&self, tconst: &str) -> Option<&[Option<String>]> {
        self.cast.get(tconst).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.cast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cast.is_empty()
    }
}
