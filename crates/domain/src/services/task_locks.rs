//! Per-task mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock table keyed by task id.
///
/// Only weak references are kept, so a task's entry disappears once no
/// holder or waiter remains.
#[derive(Debug, Default)]
pub struct TaskLocks {
    inner: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl TaskLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `task_id`.
    pub async fn lock(&self, task_id: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.retain(|_, weak| weak.strong_count() > 0);

            match map.get(task_id).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    let created = Arc::new(AsyncMutex::new(()));
                    map.insert(task_id.to_string(), Arc::downgrade(&created));
                    created
                }
            }
        };

        mutex.lock_owned().await
    }

    /// Number of live entries.
    pub fn active(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
