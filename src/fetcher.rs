//! Remote collection fetching with automatic retries
//!
//! A [`CollectionFetcher`] owns the lifecycle of one remote collection keyed
//! by an optional key: it fetches on mount and on key change, publishes a
//! snapshot of items/loading/error, and while the last attempt failed it
//! drives retry cycles through a [`RetryController`] until the fetch
//! succeeds, comes back empty, the retry bound is reached, or a newer fetch
//! supersedes it.
//!
//! Every fetch cycle carries a generation number. Results from a cycle whose
//! generation is no longer current are dropped.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::retry::{RetryConfig, RetryController, RetryState};

/// Where a collection comes from
#[async_trait]
pub trait CollectionSource: Send + Sync + 'static {
    type Key: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Item: Clone + Send + Sync + 'static;

    /// Fetch the collection for `key`. `Ok(None)` means "no data" and is
    /// stored as an empty collection.
    async fn fetch(&self, key: &Self::Key) -> Result<Option<Vec<Self::Item>>, ClientError>;
}

/// Published data state of a fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub items: Vec<T>,
    /// True only while a network call is in flight
    pub loading: bool,
    pub error: Option<String>,
    /// True while a fetch cycle (first attempt or its retries) is outstanding
    pub pending: bool,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            pending: false,
        }
    }
}

/// Point-in-time view combining data and retry state
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSnapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub attempt_count: u32,
    pub is_retrying: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
    /// Items (possibly empty) were stored
    Loaded,
    /// The error was stored
    Failed,
    /// A newer cycle took over; nothing was stored
    Superseded,
}

struct Current<K> {
    generation: u64,
    key: Option<K>,
}

struct Inner<S: CollectionSource> {
    source: S,
    current: Mutex<Current<S::Key>>,
    state: watch::Sender<FetchState<S::Item>>,
    retry: RetryController,
}

pub struct CollectionFetcher<S: CollectionSource> {
    inner: Arc<Inner<S>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl<S: CollectionSource> CollectionFetcher<S> {
    /// Create the fetcher and start fetching `key` in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(source: S, key: Option<S::Key>, retry_config: RetryConfig) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        let inner = Arc::new(Inner {
            source,
            current: Mutex::new(Current {
                generation: 0,
                key: key.clone(),
            }),
            state,
            retry: RetryController::new(retry_config),
        });

        let fetcher = Self {
            inner,
            driver: Mutex::new(None),
        };
        fetcher.restart(key);
        fetcher
    }

    pub fn key(&self) -> Option<S::Key> {
        self.inner.lock_current().key.clone()
    }

    /// Switch to a new key. Pending retries of the previous key are
    /// cancelled and its in-flight result will be discarded.
    pub fn set_key(&self, key: Option<S::Key>) {
        if self.key() == key {
            return;
        }
        log::debug!("Fetcher key changed to {:?}", key);
        self.restart(key);
    }

    /// One immediate attempt for the current key, bypassing backoff.
    ///
    /// Supersedes any pending retry. If the attempt fails, automatic retries
    /// continue in the background from the current attempt count.
    pub async fn refetch(&self) -> Result<(), String> {
        let (generation, token) = self.inner.begin_cycle(None, false);
        let outcome = self.inner.fetch_once(generation).await;

        if outcome == FetchOutcome::Failed {
            self.spawn_driver(generation, token, false);
        } else {
            self.inner.finish_cycle(generation);
        }

        match self.inner.state.borrow().error.clone() {
            Some(error) if outcome == FetchOutcome::Failed => Err(error),
            _ => Ok(()),
        }
    }

    pub fn snapshot(&self) -> FetchSnapshot<S::Item> {
        let state = self.inner.state.borrow().clone();
        let retry = self.inner.retry.state();
        FetchSnapshot {
            items: state.items,
            loading: state.loading,
            error: state.error,
            attempt_count: retry.attempt_count,
            is_retrying: retry.is_retrying,
        }
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.inner.state.borrow().items.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<S::Item>> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_retry(&self) -> watch::Receiver<RetryState> {
        self.inner.retry.subscribe()
    }

    /// Retry controller of the current cycle. Cancelling it only skips the
    /// pending delay; while the cycle is current its driver re-arms.
    pub fn retry(&self) -> &RetryController {
        &self.inner.retry
    }

    /// Wait until no fetch cycle is outstanding and return the snapshot
    pub async fn settled(&self) -> FetchSnapshot<S::Item> {
        let mut receiver = self.inner.state.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = receiver.wait_for(|state| !state.pending).await;
        self.snapshot()
    }

    /// Replace the local items, as after a mutation that returned the
    /// authoritative collection. Fetches already in flight are superseded.
    pub(crate) fn replace_items(&self, items: Vec<S::Item>) {
        self.inner.adopt(|state| state.items = items);
    }

    /// Drop items locally after a confirmed removal. Fetches already in
    /// flight are superseded.
    pub(crate) fn retain_items<F>(&self, keep: F)
    where
        F: FnMut(&S::Item) -> bool,
    {
        self.inner.adopt(|state| state.items.retain(keep));
    }

    pub(crate) fn clear_error(&self) {
        self.inner.state.send_modify(|state| state.error = None);
    }

    /// Record an error from an action and let automatic retries refetch
    /// the collection
    pub(crate) fn fail_with(&self, error: &ClientError) {
        let (generation, token) = self.inner.begin_cycle(None, false);
        if self.inner.publish(generation, |state| {
            state.loading = false;
            state.error = Some(error.to_string());
        }) {
            self.spawn_driver(generation, token, false);
        }
    }

    /// New key, fresh retry state, first attempt in the background
    fn restart(&self, key: Option<S::Key>) {
        let (generation, token) = self.inner.begin_cycle(Some(key), true);
        self.spawn_driver(generation, token, true);
    }

    fn spawn_driver(&self, generation: u64, token: CancellationToken, first_attempt: bool) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(drive(inner, generation, token, first_attempt));

        let mut driver = self
            .driver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // A replaced driver keeps running until it notices it is stale
        *driver = Some(handle);
    }
}

impl<S: CollectionSource> Drop for CollectionFetcher<S> {
    fn drop(&mut self) {
        self.inner.retry.cancel();
        let driver = self
            .driver
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = driver.take() {
            handle.abort();
        }
    }
}

async fn drive<S: CollectionSource>(
    inner: Arc<Inner<S>>,
    generation: u64,
    mut token: CancellationToken,
    first_attempt: bool,
) {
    let mut outcome = if first_attempt {
        inner.fetch_once(generation).await
    } else {
        FetchOutcome::Failed
    };

    while outcome == FetchOutcome::Failed {
        if inner.retry.exhausted() {
            log::warn!(
                "Giving up after {} retries",
                inner.retry.config().max_attempts
            );
            break;
        }

        let mut next = FetchOutcome::Superseded;
        let slot = &mut next;
        let fetch_inner = Arc::clone(&inner);
        let succeeded = inner
            .retry
            .retry_with_token(&token, move || async move {
                *slot = fetch_inner.fetch_once(generation).await;
                match *slot {
                    FetchOutcome::Failed => Err(()),
                    _ => Ok(()),
                }
            })
            .await;
        log::debug!("Retry finished (succeeded: {})", succeeded);
        outcome = next;

        if outcome == FetchOutcome::Superseded {
            // Cancelled without a newer cycle: keep retrying under a fresh token
            match inner.current_token(generation) {
                Some(fresh) => {
                    log::debug!("Retry cancelled, re-arming generation {}", generation);
                    token = fresh;
                    outcome = FetchOutcome::Failed;
                }
                None => break,
            }
        }
    }

    if outcome != FetchOutcome::Superseded {
        inner.finish_cycle(generation);
    }
}

impl<S: CollectionSource> Inner<S> {
    fn lock_current(&self) -> MutexGuard<'_, Current<S::Key>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new cycle, optionally switching key. Returns the cycle's
    /// generation and the retry token it must use.
    fn begin_cycle(
        &self,
        key: Option<Option<S::Key>>,
        reset_retries: bool,
    ) -> (u64, CancellationToken) {
        let mut current = self.lock_current();
        current.generation += 1;
        if let Some(key) = key {
            current.key = key;
        }
        self.retry.cancel();
        if reset_retries {
            self.retry.reset();
        }
        self.state.send_modify(|state| state.pending = true);
        (current.generation, self.retry.token())
    }

    /// Retry token for `generation`, if it is still the current cycle
    fn current_token(&self, generation: u64) -> Option<CancellationToken> {
        let current = self.lock_current();
        (current.generation == generation).then(|| self.retry.token())
    }

    /// Apply a local update that is authoritative for the collection: any
    /// running cycle is superseded and retry state starts over
    fn adopt<F>(&self, update: F)
    where
        F: FnOnce(&mut FetchState<S::Item>),
    {
        let mut current = self.lock_current();
        current.generation += 1;
        self.retry.cancel();
        self.retry.reset();
        self.state.send_modify(|state| {
            update(state);
            state.loading = false;
            state.error = None;
            state.pending = false;
        });
    }

    fn finish_cycle(&self, generation: u64) {
        self.publish(generation, |state| state.pending = false);
    }

    /// Apply `update` only if `generation` is still current
    fn publish<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut FetchState<S::Item>),
    {
        let current = self.lock_current();
        if current.generation != generation {
            return false;
        }
        self.state.send_modify(update);
        true
    }

    async fn fetch_once(&self, generation: u64) -> FetchOutcome {
        let key = {
            let current = self.lock_current();
            if current.generation != generation {
                return FetchOutcome::Superseded;
            }
            current.key.clone()
        };

        let Some(key) = key else {
            let stored = self.publish(generation, |state| {
                state.items.clear();
                state.loading = false;
                state.error = None;
            });
            if !stored {
                return FetchOutcome::Superseded;
            }
            self.retry.reset();
            return FetchOutcome::Loaded;
        };

        if !self.publish(generation, |state| {
            state.loading = true;
            state.error = None;
        }) {
            return FetchOutcome::Superseded;
        }

        let result = self.source.fetch(&key).await;

        match result {
            Ok(items) => {
                let items = items.unwrap_or_default();
                let stored = self.publish(generation, |state| {
                    state.items = items;
                    state.loading = false;
                    state.error = None;
                });
                if !stored {
                    return FetchOutcome::Superseded;
                }
                self.retry.reset();
                FetchOutcome::Loaded
            }
            Err(e) if e.is_not_found() => {
                log::debug!("No data for {:?}: {}", key, e);
                let stored = self.publish(generation, |state| {
                    state.items.clear();
                    state.loading = false;
                    state.error = None;
                });
                if !stored {
                    return FetchOutcome::Superseded;
                }
                self.retry.reset();
                FetchOutcome::Loaded
            }
            Err(e) => {
                log::warn!("Fetch for {:?} failed: {}", key, e);
                let stored = self.publish(generation, |state| {
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
                if stored {
                    FetchOutcome::Failed
                } else {
                    FetchOutcome::Superseded
                }
            }
        }
    }
}
