use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A map of per-key mutexes.
///
/// Entries are created on first use and dropped again once no caller holds or waits
/// on them, so the map only ever contains keys with work in flight.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    entries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` while holding the lock for `key`. Different keys never block each other.
    pub(crate) fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let release = Release {
            locks: self,
            key,
            entry: Arc::clone(self.table().entry(key.to_string()).or_default()),
        };
        let _guard = release.entry.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table().len()
    }
}

/// Drops the table entry for `key` once the last holder is done, even when `f` panics.
struct Release<'a> {
    locks: &'a KeyedLocks,
    key: &'a str,
    entry: Arc<Mutex<()>>,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        // One reference lives in the table and one is ours; anything more is a waiter.
        if Arc::strong_count(&self.entry) == 2 {
            table.remove(self.key);
        }
    }
}
