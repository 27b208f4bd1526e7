use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::Mutex as AsyncMutex;

use crate::ids::ObjectId;

/// Dead entries are pruned once the registry grows past this size
const PRUNE_THRESHOLD: usize = 1024;

/// Per-target async mutexes serializing aggregate recomputation
///
/// Entries are held weakly, a target's mutex lives as long as someone is
/// waiting on or holding it.
#[derive(Clone, Default)]
pub struct TargetLocks {
    inner: Arc<Mutex<HashMap<ObjectId, Weak<AsyncMutex<()>>>>>,
}

impl TargetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutex guarding the given target
    pub fn lock_for(&self, target_id: &ObjectId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(lock) = locks.get(target_id).and_then(Weak::upgrade) {
            return lock;
        }

        if locks.len() >= PRUNE_THRESHOLD {
            locks.retain(|_, lock| lock.strong_count() > 0);
        }

        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(target_id.clone(), Arc::downgrade(&lock));
        lock
    }

    /// Number of registry entries still referenced
    pub fn active(&self) -> usize {
        let locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|lock| lock.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_target_shares_a_lock() {
        let locks = TargetLocks::new();
        let target = ObjectId::new();

        let first = locks.lock_for(&target);
        let second = locks.lock_for(&target);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(locks.active(), 1);
    }

    #[test]
    fn test_distinct_targets_get_distinct_locks() {
        let locks = TargetLocks::new();

        let first = locks.lock_for(&ObjectId::new());
        let second = locks.lock_for(&ObjectId::new());

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_released_locks_are_not_active() {
        let locks = TargetLocks::new();
        {
            let _lock = locks.lock_for(&ObjectId::new());
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_lock_excludes_concurrent_holders() {
        let locks = TargetLocks::new();
        let target = ObjectId::new();

        let lock = locks.lock_for(&target);
        let _guard = lock.lock().await;

        let other = locks.lock_for(&target);
        assert!(other.try_lock().is_err());
    }
}
