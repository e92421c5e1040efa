//! Hash joins keyed on source identifiers.
//!
//! Right sides are indexed first-wins, so duplicated identifiers never fan
//! out a join. Left-side order is preserved in every join output.

pub mod hash;

use cinefold_core::model::{CrewAssignment, Person, Rating, Title};

/// Rows that carry their own join key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Title {
    fn key(&self) -> &str {
        &self.tconst
    }
}

impl Keyed for Rating {
    fn key(&self) -> &str {
        &self.tconst
    }
}

impl Keyed for CrewAssignment {
    fn key(&self) -> &str {
        &self.tconst
    }
}

impl Keyed for Person {
    fn key(&self) -> &str {
        &self.nconst
    }
}

/// Keep the first row for each key, in input order. Returns the number of
/// later duplicates dropped.
pub fn dedup_by_key<T: Keyed>(rows: Vec<T>) -> (Vec<T>, usize) {
    let mut seen = std::collections::HashSet::with_capacity(rows.len());
    let before = rows.len();
    let kept: Vec<T> = rows
        .into_iter()
        .filter(|r| seen.insert(r.key().to_string()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
