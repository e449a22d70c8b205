// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::{
    FutureExt,
    channel::oneshot,
    future::{Shared, join_all},
};
use tracing::{debug, instrument, warn};

use crate::{Loader, LoaderError};

type LoadResult<V> = Result<V, LoaderError>;
type PendingResult<V> = Shared<oneshot::Receiver<LoadResult<V>>>;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of times a `load` call yields to the scheduler before dispatching the queued keys.
    /// Each yield gives sibling futures a chance to queue their keys into the same batch.
    pub yield_count: usize,
    /// Upper bound on the number of keys passed to a single `load_many` call. Larger batches are
    /// split into chunks.
    pub max_batch_size: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            yield_count: 10,
            max_batch_size: None,
        }
    }
}

#[derive(Clone)]
enum Entry<V> {
    Ready(LoadResult<V>),
    Pending(PendingResult<V>),
}

struct Queued<K, V> {
    key: K,
    sender: oneshot::Sender<LoadResult<V>>,
    pending: PendingResult<V>,
}

struct State<K, V> {
    entries: HashMap<K, Entry<V>>,
    queue: Vec<Queued<K, V>>,
}

fn lock<K, V>(state: &Mutex<State<K, V>>) -> MutexGuard<'_, State<K, V>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keys taken off the queue for one `load_many` call.
///
/// The batch runs inside whichever `load` future dispatched it. If that future is dropped before
/// the results are sent, the keys' pending entries are removed on drop, and their waiters queue
/// them again.
struct InFlightBatch<'a, K: Eq + Hash, V: Clone> {
    state: &'a Mutex<State<K, V>>,
    queued: Vec<Queued<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Drop for InFlightBatch<'_, K, V> {
    fn drop(&mut self) {
        if self.queued.is_empty() {
            return;
        }

        let mut state = lock(self.state);
        for queued in &self.queued {
            // A key cleared and queued again belongs to another batch
            if let Some(Entry::Pending(pending)) = state.entries.get(&queued.key)
                && pending.ptr_eq(&queued.pending)
            {
                state.entries.remove(&queued.key);
            }
        }
        // The senders drop with `queued` after the lock is released, waking the waiters
    }
}

/// Coalesces `load` calls into batches and caches their results.
pub struct BatchLoader<L: Loader> {
    loader: Arc<L>,
    config: BatchConfig,
    state: Mutex<State<L::Key, L::Value>>,
}

impl<L: Loader> BatchLoader<L> {
    pub fn new(loader: L) -> Self {
        Self::with_config(Arc::new(loader), BatchConfig::default())
    }

    pub fn with_config(loader: Arc<L>, config: BatchConfig) -> Self {
        Self {
            loader,
            config,
            state: Mutex::new(State {
                entries: HashMap::new(),
                queue: vec![],
            }),
        }
    }

    /// Load the value for `key`.
    ///
    /// A cached key (loaded, failed, or already queued) never causes another call to the batch
    /// function. A new key is queued, and once the caller has yielded `yield_count` times, whatever
    /// is queued at that point (its own key and those of any sibling futures) is dispatched as one
    /// batch.
    ///
    /// Dropping the returned future does not affect other callers waiting on the same batch.
    pub async fn load(&self, key: L::Key) -> Result<L::Value, LoaderError> {
        loop {
            let pending = match self.enqueue(key.clone()) {
                Entry::Ready(result) => return result,
                Entry::Pending(pending) => pending,
            };

            for _ in 0..self.config.yield_count {
                tokio::task::yield_now().await;
            }

            // Whoever gets here first dispatches everything queued so far (including keys queued
            // by others). For the rest this is a no-op and they wait for the shared result.
            self.dispatch_queued().await;

            match pending.await {
                Ok(result) => return result,
                Err(oneshot::Canceled) => {
                    debug!(?key, "Dispatching load was dropped, queueing the key again");
                }
            }
        }
    }

    /// Load several keys, coalescing them into as few batches as possible.
    pub async fn load_many(
        &self,
        keys: impl IntoIterator<Item = L::Key>,
    ) -> Vec<Result<L::Value, LoaderError>> {
        join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Seed the cache. Has no effect if the key is already cached or queued.
    pub fn prime(&self, key: L::Key, value: L::Value) {
        self.state()
            .entries
            .entry(key)
            .or_insert(Entry::Ready(Ok(value)));
    }

    /// Forget the cached result for `key` so the next `load` fetches it again.
    pub fn clear(&self, key: &L::Key) {
        self.state().entries.remove(key);
    }

    fn enqueue(&self, key: L::Key) -> Entry<L::Value> {
        let mut state = self.state();

        if let Some(entry) = state.entries.get(&key) {
            return entry.clone();
        }

        let (sender, receiver) = oneshot::channel();
        let pending = receiver.shared();
        state
            .entries
            .insert(key.clone(), Entry::Pending(pending.clone()));
        state.queue.push(Queued {
            key,
            sender,
            pending: pending.clone(),
        });

        Entry::Pending(pending)
    }

    async fn dispatch_queued(&self) {
        let queued = std::mem::take(&mut self.state().queue);

        if queued.is_empty() {
            return;
        }

        let chunks = match self.config.max_batch_size {
            Some(max_batch_size) if max_batch_size > 0 && queued.len() > max_batch_size => {
                let mut chunks = vec![];
                let mut queued = queued.into_iter();
                loop {
                    let chunk: Vec<_> = queued.by_ref().take(max_batch_size).collect();
                    if chunk.is_empty() {
                        break;
                    }
                    chunks.push(chunk);
                }
                chunks
            }
            _ => vec![queued],
        };

        // Guarded before the first await, so dropping this future at any point releases the keys
        let batches: Vec<_> = chunks
            .into_iter()
            .map(|queued| InFlightBatch {
                state: &self.state,
                queued,
            })
            .collect();

        join_all(batches.into_iter().map(|batch| self.dispatch(batch))).await;
    }

    #[instrument(
        name = "BatchLoader::dispatch",
        skip_all,
        fields(batch_size = batch.queued.len())
    )]
    async fn dispatch(&self, mut batch: InFlightBatch<'_, L::Key, L::Value>) {
        let keys: Vec<_> = batch.queued.iter().map(|queued| queued.key.clone()).collect();

        debug!(?keys, "Dispatching batch");

        let results: Vec<LoadResult<L::Value>> = match self.loader.load_many(&keys).await {
            Ok(values) if values.len() == keys.len() => values.into_iter().map(Ok).collect(),
            Ok(values) => {
                let error = LoaderError::BatchSizeMismatch {
                    expected: keys.len(),
                    actual: values.len(),
                };
                warn!(%error, "Batch function returned a mismatched number of values");
                vec![Err(error); keys.len()]
            }
            Err(error) => {
                warn!(%error, "Batch function failed");
                vec![Err(LoaderError::Batch(Arc::new(error))); keys.len()]
            }
        };

        let queued = std::mem::take(&mut batch.queued);

        {
            let mut state = self.state();
            for (queued, result) in queued.iter().zip(results.iter()) {
                // Keys cleared while the batch was in flight stay cleared
                if let Some(Entry::Pending(pending)) = state.entries.get(&queued.key)
                    && pending.ptr_eq(&queued.pending)
                {
                    state
                        .entries
                        .insert(queued.key.clone(), Entry::Ready(result.clone()));
                }
            }
        }

        for (queued, result) in queued.into_iter().zip(results) {
            // The receiving side may have been dropped (cancelled field); nothing to do then
            let _ = queued.sender.send(result);
        }
    }

    fn state(&self) -> MutexGuard<'_, State<L::Key, L::Value>> {
        lock(&self.state)
    }
}
