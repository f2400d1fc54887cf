//! Bounded memoization of detection results
//!
//! Detection is a pure function of at most the first [`KEY_LEN`] bytes of a
//! buffer, so those bytes are an exact cache key. The cache is a plain LRU
//! capped at a configurable number of entries.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::signature::FileType;

/// Leading bytes used as the cache key.
pub const KEY_LEN: usize = 64;

/// Capacity of the process-wide cache when none was configured.
pub const DEFAULT_CAPACITY: usize = 1024;

static GLOBAL: OnceLock<DetectionCache> = OnceLock::new();

/// Process-wide cache used by [`crate::detect`].
pub fn global() -> &'static DetectionCache {
    GLOBAL.get_or_init(|| DetectionCache::new(DEFAULT_CAPACITY))
}

/// Set the capacity of the process-wide cache.
///
/// Only effective before the first detection; returns `false` if the cache
/// was already initialized.
pub fn configure_global_cache(capacity: usize) -> bool {
    GLOBAL.set(DetectionCache::new(capacity)).is_ok()
}

/// A capacity-bounded LRU map from leading bytes to [`FileType`].
#[derive(Debug)]
pub struct DetectionCache {
    capacity: usize,
    inner: Mutex<LruState>,
}

#[derive(Debug, Default)]
struct LruState {
    entries: HashMap<Vec<u8>, (FileType, u64)>,
    recency: BTreeMap<u64, Vec<u8>>,
    tick: u64,
}

impl DetectionCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(LruState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `data`, computing and storing the result with `detect` on a miss.
    ///
    /// `detect` runs outside the lock; concurrent misses on the same key may
    /// both compute, which is harmless since the result is deterministic.
    pub fn get_or_insert_with(&self, data: &[u8], detect: impl FnOnce(&[u8]) -> FileType) -> FileType {
        let key = &data[..data.len().min(KEY_LEN)];

        if let Some(hit) = self.get(key) {
            return hit;
        }

        let file_type = detect(data);
        self.insert(key.to_vec(), file_type);
        file_type
    }

    fn get(&self, key: &[u8]) -> Option<FileType> {
        let mut state = self.inner.lock();
        state.tick += 1;
        let tick = state.tick;

        let (file_type, old_tick) = {
            let entry = state.entries.get_mut(key)?;
            let old = entry.1;
            entry.1 = tick;
            (entry.0, old)
        };
        if let Some(k) = state.recency.remove(&old_tick) {
            state.recency.insert(tick, k);
        }
        Some(file_type)
    }

    fn insert(&self, key: Vec<u8>, file_type: FileType) {
        let mut state = self.inner.lock();
        state.tick += 1;
        let tick = state.tick;

        if let Some((_, old_tick)) = state.entries.insert(key.clone(), (file_type, tick)) {
            state.recency.remove(&old_tick);
        }
        state.recency.insert(tick, key);

        while state.entries.len() > self.capacity {
            let Some((_, oldest)) = state.recency.pop_first() else {
                break;
            };
            state.entries.remove(&oldest);
        }
    }
}
