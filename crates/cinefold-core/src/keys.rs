//! The working identifier set: movie ids that survived the mandatory joins.

use std::collections::HashSet;
use std::sync::Arc;

/// Read-only membership oracle shared with the cast aggregator. Built once by
/// the key-set planner; there is no way to mutate it afterwards.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    ids: Arc<HashSet<String>>,
}

impl WorkingSet {
    pub fn contains(&self, tconst: &str) -> bool {
        self.ids.contains(tconst)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted copy of the ids, for reports and tests.
    pub fn sorted(&self) -> Vec<String> {
        let mut v: Vec<String> = self.ids.iter().cloned().collect();
        v.sort();
        v
    }
}

impl FromIterator<String> for WorkingSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: Arc::new(iter.into_iter().collect()),
        }
    }
}
