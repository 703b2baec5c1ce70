use std::hash::Hash;

use indexmap::IndexMap;

/// Segmented LRU cache.
///
/// New entries land in the probationary segment; a second hit promotes them
/// to the protected segment. Protected overflow demotes its oldest entry
/// back to probation, probation overflow evicts. A one-off scan therefore
/// only churns probation and leaves frequently revisited entries alone.
///
/// Both segments are ordered oldest first.
#[derive(Debug, Clone)]
pub struct SlruCache<K, V> {
    probation: IndexMap<K, V>,
    protected: IndexMap<K, V>,
    probation_capacity: usize,
    protected_capacity: usize,
}

impl<K: Hash + Eq, V> SlruCache<K, V> {
    /// `capacity` is split between the two segments, protected taking the
    /// larger half
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let probation_capacity = capacity / 2;
        Self {
            probation: IndexMap::with_capacity(probation_capacity),
            protected: IndexMap::new(),
            probation_capacity,
            protected_capacity: capacity - probation_capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.probation_capacity + self.protected_capacity
    }

    pub fn len(&self) -> usize {
        self.probation.len() + self.protected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.probation.contains_key(key) || self.protected.contains_key(key)
    }

    /// Look up without touching recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.protected.get(key).or_else(|| self.probation.get(key))
    }

    pub fn is_protected(&self, key: &K) -> bool {
        self.protected.contains_key(key)
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if let Some((k, v)) = self.protected.shift_remove_entry(key) {
            self.protected.insert(k, v);
            return self.protected.get(key);
        }
        let (k, v) = self.probation.shift_remove_entry(key)?;
        self.protected.insert(k, v);
        if self.protected.len() > self.protected_capacity {
            if let Some((old_key, old_value)) = self.protected.shift_remove_index(0) {
                self.insert_probation(old_key, old_value);
            }
        }
        self.protected.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.protected.get_mut(&key) {
            *slot = value;
            return;
        }
        self.probation.shift_remove(&key);
        self.insert_probation(key, value);
    }

    fn insert_probation(&mut self, key: K, value: V) {
        self.probation.insert(key, value);
        if self.probation.len() > self.probation_capacity {
            self.probation.shift_remove_index(0);
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.protected
            .shift_remove(key)
            .or_else(|| self.probation.shift_remove(key))
    }

    /// Drop entries failing `keep`; survivors keep their order
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) {
        self.probation.retain(|k, v| keep(k, v));
        self.protected.retain(|k, v| keep(k, v));
    }

    /// Re-key every entry, dropping those mapped to `None`. Order is kept.
    pub fn remap_keys(&mut self, mut remap: impl FnMut(&K) -> Option<K>) {
        self.probation = std::mem::take(&mut self.probation)
            .into_iter()
            .filter_map(|(k, v)| remap(&k).map(|k| (k, v)))
            .collect();
        self.protected = std::mem::take(&mut self.protected)
            .into_iter()
            .filter_map(|(k, v)| remap(&k).map(|k| (k, v)))
            .collect();
    }

    pub fn clear(&mut self) {
        self.probation.clear();
        self.protected.clear();
    }
}
