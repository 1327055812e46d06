//! Coalescing of rapid edits.
//!
//! [`Debouncer`] delays a task per key and cancels the pending one when a
//! newer task for the same key arrives. Once the delay has elapsed the task
//! runs detached, so a later schedule never cancels a request already in
//! flight. [`EditSequence`] lets the handler of such a request tell whether
//! a newer edit has been issued since, and tracks which keys still have an
//! edit whose answer is outstanding.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer<K> {
    delay: Duration,
    pending: Mutex<HashMap<K, JoinHandle<()>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run `task` after the delay unless another task is scheduled for
    /// `key` first.
    pub fn schedule<F>(&self, key: K, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|_, handle| !handle.is_finished());
        if let Some(previous) = pending.insert(key, timer) {
            previous.abort();
        }
    }

    /// Whether a task for `key` is still waiting for its delay.
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Edit counter. Sequence numbers increase across all keys, so a key that
/// was settled and edited again never reuses a number.
pub struct EditSequence<K> {
    inner: Mutex<Edits<K>>,
}

struct Edits<K> {
    counter: u64,
    latest: HashMap<K, u64>,
}

impl<K: Eq + Hash> EditSequence<K> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Edits {
                counter: 0,
                latest: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Edits<K>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new edit for `key` and return its sequence number.
    pub fn next(&self, key: K) -> u64 {
        let mut edits = self.lock();
        edits.counter += 1;
        let seq = edits.counter;
        edits.latest.insert(key, seq);
        seq
    }

    pub fn is_latest(&self, key: &K, seq: u64) -> bool {
        self.lock().latest.get(key).is_some_and(|latest| *latest == seq)
    }

    /// Forget `key` once the answer to edit `seq` has been applied. A newer
    /// edit keeps the key open.
    pub fn settle(&self, key: &K, seq: u64) {
        let mut edits = self.lock();
        if edits.latest.get(key) == Some(&seq) {
            edits.latest.remove(key);
        }
    }

    /// Whether `key` has an edit whose answer has not been applied.
    pub fn is_unsettled(&self, key: &K) -> bool {
        self.lock().latest.contains_key(key)
    }
}

impl<K: Eq + Hash> Default for EditSequence<K> {
    fn default() -> Self {
        Self::new()
    }
}
