use std::ops::Range;

use tracing::trace;

use super::slru::SlruCache;
use crate::list::Replace;

/// Row-keyed cache that follows structural edits.
///
/// On a [`Replace`] it evicts rows inside the replaced span and re-keys the
/// rows after it; the new rows are simply absent and get computed again on
/// the next lookup.
#[derive(Debug, Clone)]
pub struct RowCache<V> {
    entries: SlruCache<usize, V>,
    hits: u64,
    misses: u64,
}

impl<V: Clone> RowCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: SlruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, row: usize) -> Option<V> {
        let found = self.entries.get(&row).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, row: usize, value: V) {
        self.entries.insert(row, value);
    }

    /// Return the cached row or compute, store and return it.
    ///
    /// `compute` must be deterministic; two misses on the same row have to
    /// produce the same value.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        row: usize,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(row) {
            return Ok(value);
        }
        let value = compute()?;
        self.entries.insert(row, value.clone());
        Ok(value)
    }

    pub fn contains(&self, row: usize) -> bool {
        self.entries.contains(&row)
    }

    /// Drop rows in `range` without touching the recency of the rest
    pub fn invalidate(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        self.entries.retain(|row, _| !range.contains(row));
    }

    pub fn apply(&mut self, replace: &Replace) {
        self.entries.remap_keys(|row| replace.map_row(*row));
        trace!(?replace, cached = self.entries.len(), "row cache shifted");
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled(rows: usize) -> RowCache<String> {
        let mut cache = RowCache::new(64);
        for row in 0..rows {
            cache.insert(row, format!("row{}", row));
        }
        cache
    }

    #[test]
    fn test_apply_fold_replace() {
        let mut cache = filled(11);
        cache.apply(&Replace::new(3, 7, 1));

        let present: Vec<usize> = (0..11).filter(|row| cache.contains(*row)).collect();
        // rows 3..7 evicted, new row 3 pending, old 7..10 moved to 4..7
        assert_eq!(present, vec![0, 1, 2, 4, 5, 6, 7]);
        assert_eq!(cache.get(4), Some("row7".to_string()));
        assert_eq!(cache.get(7), Some("row10".to_string()));
        assert_eq!(cache.get(3), None);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut cache = filled(10);
        cache.get(5);
        cache.invalidate(3..7);

        assert!(!cache.contains(5));
        let value: Result<String, ()> = cache.get_or_try_insert_with(5, || Ok("fresh".to_string()));
        assert_eq!(value, Ok("fresh".to_string()));
        assert!(cache.contains(2));
        assert!(cache.contains(7));
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let mut cache: RowCache<u32> = RowCache::new(8);
        let result = cache.get_or_try_insert_with(0, || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 1));
    }
}
