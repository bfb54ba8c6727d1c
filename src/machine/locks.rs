//! Per-entity mutual exclusion.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per entity identity.
///
/// Entries are created on first use and dropped again as soon as nobody
/// holds or waits on them, so the map only grows with concurrently
/// touched entities.
pub(crate) struct EntityLocks<K: Eq + Hash + Clone> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> EntityLocks<K> {
    pub(crate) fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`.
    pub(crate) async fn acquire(&self, key: &K) -> EntityGuard<'_, K> {
        // Clone the Arc under the shard lock, then release it before awaiting.
        let mutex = Arc::clone(
            self.locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = mutex.lock_owned().await;
        EntityGuard {
            guard: Some(guard),
            key: key.clone(),
            locks: &self.locks,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Held for the duration of one machine operation.
pub(crate) struct EntityGuard<'a, K: Eq + Hash + Clone> {
    guard: Option<OwnedMutexGuard<()>>,
    key: K,
    locks: &'a DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> Drop for EntityGuard<'_, K> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map's own handle left: nobody holds or waits on it.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
