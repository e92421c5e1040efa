//! Build-side hash index and the inner/left join drivers.

use std::collections::HashMap;

use super::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Drop left rows without a match.
    Inner,
    /// Keep every left row; the right side is `None` when unmatched.
    Left,
}

/// Right side of a join, indexed by key. The first row seen for a key wins.
#[derive(Debug, Clone)]
pub struct HashIndex<V> {
    rows: HashMap<String, V>,
    duplicates: usize,
}

impl<V: Keyed> HashIndex<V> {
    pub fn build(rows: impl IntoIterator<Item = V>) -> Self {
        let mut map = HashMap::new();
        let mut duplicates = 0;
        for row in rows {
            let key = row.key().to_string();
            if map.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            map.insert(key, row);
        }
        Self {
            rows: map,
            duplicates,
        }
    }
}

impl<V> HashIndex<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows discarded at build time because their key was already present.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Join `left` against this index. `key` extracts the left join key;
    /// a left row with no key never matches.
    pub fn join<L, K>(&self, left: Vec<L>, join_type: JoinType, key: K) -> Vec<(L, Option<&V>)>
    where
        K: Fn(&L) -> Option<&str>,
    {
        let mut out = Vec::with_capacity(left.len());
        for l in left {
            let hit = key(&l).and_then(|k| self.rows.get(k));
            match (hit, join_type) {
                (Some(r), _) => out.push((l, Some(r))),
                (None, JoinType::Left) => out.push((l, None)),
                (None, JoinType::Inner) => {}
            }
        }
        out
    }
}

/// Inner join; every output pair has a match.
pub fn inner_join<'r, L, V, K>(left: Vec<L>, right: &'r HashIndex<V>, key: K) -> Vec<(L, &'r V)>
where
    K: Fn(&L) -> Option<&str>,
{
    right
        .join(left, JoinType::Inner, key)
        .into_iter()
        .filter_map(|(l, r)| r.map(|r| (l, r)))
        .collect()
}

pub fn left_join<'r, L, V, K>(
    left: Vec<L>,
    right: &'r HashIndex<V>,
    key: K,
) -> Vec<(L, Option<&'r V>)>
where
    K: Fn(&L) -> Option<&str>,
{
    right.join(left, JoinType::Left, key)
}
