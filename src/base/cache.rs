//! Concurrent compute-once-per-key cache.
//!
//! Lookups take a shared read lock. On a miss the value is computed with no
//! lock held and then inserted; two threads racing on the same key may both
//! compute, and the last insert wins. This keeps expensive work off the lock
//! at the price of a rare duplicate computation.

use std::hash::Hash;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// A map from key to computed value, safe for concurrent get-or-add.
pub struct ComputeCache<K, V> {
    entries: RwLock<FxHashMap<K, V>>,
}

impl<K, V> Default for ComputeCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<K, V> ComputeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached value without computing.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Get the cached value for `key`, computing it on a miss.
    pub fn get_or_compute(&self, key: &K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.entries.write().insert(key.clone(), value.clone());
        value
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but failures are not cached.
    pub fn try_get_or_compute<E>(
        &self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.entries.write().insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Drop the cached value for `key`, if any.
    pub fn invalidate(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
