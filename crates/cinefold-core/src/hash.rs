//! Stable hashing helpers for output digests.

use blake3::Hasher;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    let mut h = Hasher::new();
    h.update(bytes);
    Hash256(h.finalize().into())
}

/// Order-sensitive digest of a sequence of records, one JSON line each.
pub fn digest_records<'a, T, I>(records: I) -> Result<Hash256, crate::error::Error>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut h = Hasher::new();
    for r in records {
        let line = serde_json::to_vec(r).map_err(|e| crate::error::Error::Hash(e.to_string()))?;
        h.update(&line);
        h.update(b"\n");
    }
    Ok(Hash256(h.finalize().into()))
}
