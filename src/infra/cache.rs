use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::entities::dataset::ConsolidatedTable;
use crate::domain::errors::ConsolidateError;

pub const DEFAULT_CACHE_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut out = [0_u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Consolidated tables keyed by the hash of the uploaded bytes.
/// Failed loads are never stored; the oldest entry is evicted at capacity.
pub struct LoadCache {
    capacity: usize,
    entries: IndexMap<ContentHash, Arc<ConsolidatedTable>>,
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl LoadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn get_or_load<F>(
        &mut self,
        bytes: &[u8],
        load: F,
    ) -> Result<Arc<ConsolidatedTable>, ConsolidateError>
    where
        F: FnOnce(&[u8]) -> Result<ConsolidatedTable, ConsolidateError>,
    {
        let hash = ContentHash::of(bytes);
        if let Some(table) = self.entries.get(&hash) {
            debug!(%hash, "load cache hit");
            return Ok(Arc::clone(table));
        }

        debug!(%hash, "load cache miss");
        let table = Arc::new(load(bytes)?);
        if self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(hash, Arc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn content_hash_is_hex_sha256() {
        assert_eq!(
            ContentHash::of(b"").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn second_load_of_same_bytes_hits_cache() {
        let mut cache = LoadCache::default();
        let calls = Cell::new(0);
        let load = |_: &[u8]| {
            calls.set(calls.get() + 1);
            Ok(ConsolidatedTable::default())
        };

        cache.get_or_load(b"same", load).expect("load should succeed");
        cache.get_or_load(b"same", load).expect("load should succeed");

        assert_eq!(calls.get(), 1, "second call should be served from cache");
        assert!(cache.contains(&ContentHash::of(b"same")));
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = LoadCache::default();
        let result = cache.get_or_load(b"bad", |_| Err(ConsolidateError::EmptyResult));

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let mut cache = LoadCache::new(2);
        for bytes in [b"a".as_slice(), b"b", b"c"] {
            cache
                .get_or_load(bytes, |_| Ok(ConsolidatedTable::default()))
                .expect("load should succeed");
        }

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&ContentHash::of(b"a")));
        assert!(cache.contains(&ContentHash::of(b"c")));
    }
}
