//! Key-addressed query cache.
//!
//! [`QueryClient`] owns every fetched snapshot. Reads go through
//! [`QueryClient::fetch_query`], which serves fresh entries from memory and
//! de-duplicates concurrent fetches for the same key; writes go through
//! [`QueryClient::mutate`], which applies [`CacheEffect`]s only after the
//! mutation succeeds. Changes are broadcast as [`CacheEvent`]s.
//!
//! The entry map sits behind a `std::sync::Mutex` that is never held across
//! an `.await`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::broadcast;

use sca_client::{ApiError, ApiResult};

use crate::config::{QueryClientConfig, QueryOptions, StaleTime};
use crate::key::QueryKey;
use crate::retry::{run_with_retry, RetryPolicy};

/// Type-erased cached value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, ApiResult<AnyValue>>>;

/// Default buffer capacity for the cache event channel.
const DEFAULT_EVENT_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// CacheEntry
// ---------------------------------------------------------------------------

struct InFlight {
    id: u64,
    /// Entry generation when the fetch started.
    generation: u64,
    fetch: SharedFetch,
}

/// State held for one key: a value slot, an error slot and bookkeeping.
#[derive(Default)]
pub struct CacheEntry {
    value: Option<AnyValue>,
    error: Option<ApiError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Bumped by every invalidation and seed.
    generation: u64,
    in_flight: Option<InFlight>,
}

impl CacheEntry {
    /// An entry holding `value`, fetched at `updated_at`.
    pub fn fetched<T: Send + Sync + 'static>(value: T, updated_at: Instant) -> Self {
        Self {
            value: Some(Arc::new(value)),
            updated_at: Some(updated_at),
            ..Default::default()
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Mark the entry stale.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
        self.generation += 1;
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("has_value", &self.has_value())
            .field("error", &self.error)
            .field("updated_at", &self.updated_at)
            .field("invalidated", &self.invalidated)
            .field("generation", &self.generation)
            .field("fetching", &self.is_fetching())
            .finish()
    }
}

/// Decide whether a read of `entry` at `now` must go to the network.
///
/// True when nothing is cached, the entry was invalidated, or the value
/// is at least `stale_time` old.
pub fn should_refetch(entry: &CacheEntry, stale_time: StaleTime, now: Instant) -> bool {
    let Some(updated_at) = entry.updated_at.filter(|_| entry.has_value()) else {
        return true;
    };
    if entry.invalidated {
        return true;
    }
    match stale_time {
        StaleTime::Never => false,
        StaleTime::After(window) => now.saturating_duration_since(updated_at) >= window,
    }
}

// ---------------------------------------------------------------------------
// Events and effects
// ---------------------------------------------------------------------------

/// Change notification published by the [`QueryClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// A fetch or seed stored a new value.
    Updated(QueryKey),
    /// A fetch failed; the error slot was set.
    Failed { key: QueryKey, error: ApiError },
    /// Every entry under this prefix was marked stale.
    Invalidated(QueryKey),
    /// The entry was dropped.
    Removed(QueryKey),
}

impl CacheEvent {
    /// Whether a view reading `key` should re-read after this event.
    pub fn affects(&self, key: &QueryKey) -> bool {
        match self {
            CacheEvent::Updated(k) | CacheEvent::Removed(k) => k == key,
            CacheEvent::Failed { key: k, .. } => k == key,
            CacheEvent::Invalidated(prefix) => key.starts_with(prefix),
        }
    }
}

/// Cache change applied after a successful mutation.
pub enum CacheEffect {
    /// Store a value at a key as freshly fetched.
    Seed { key: QueryKey, value: AnyValue },
    /// Drop the entry at exactly this key.
    Remove(QueryKey),
    /// Mark every entry under this prefix stale.
    Invalidate(QueryKey),
}

impl CacheEffect {
    pub fn seed<T: Send + Sync + 'static>(key: QueryKey, value: T) -> Self {
        CacheEffect::Seed {
            key,
            value: Arc::new(value),
        }
    }
}

impl fmt::Debug for CacheEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEffect::Seed { key, .. } => f.debug_tuple("Seed").field(key).finish(),
            CacheEffect::Remove(key) => f.debug_tuple("Remove").field(key).finish(),
            CacheEffect::Invalidate(key) => f.debug_tuple("Invalidate").field(key).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// QueryState
// ---------------------------------------------------------------------------

/// Snapshot of both slots of an entry, as a view sees them.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
    pub is_fetching: bool,
    pub is_invalidated: bool,
}

/// What a view should render for a [`QueryState`].
#[derive(Debug, PartialEq)]
pub enum QueryView<'a, T> {
    Idle,
    Loading,
    Failed(&'a ApiError),
    Ready(&'a T),
}

impl<T> QueryState<T> {
    /// A cached value wins over a stored error; the error shows only when
    /// there is nothing else to display.
    pub fn view(&self) -> QueryView<'_, T> {
        match (&self.data, &self.error) {
            (Some(data), _) => QueryView::Ready(data.as_ref()),
            (None, Some(error)) => QueryView::Failed(error),
            (None, None) if self.is_fetching => QueryView::Loading,
            (None, None) => QueryView::Idle,
        }
    }
}

// ---------------------------------------------------------------------------
// QueryClient
// ---------------------------------------------------------------------------

struct Inner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    events: broadcast::Sender<CacheEvent>,
    config: QueryClientConfig,
    next_fetch_id: AtomicU64,
}

/// Shared handle to one cache. Cloning is cheap and every clone sees the
/// same entries.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryClientConfig::default())
    }
}

impl QueryClient {
    pub fn new(config: QueryClientConfig) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                events,
                config,
                next_fetch_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &QueryClientConfig {
        &self.inner.config
    }

    /// Receive every [`CacheEvent`] published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Read `key`, fetching it with `fetcher` when absent or stale.
    ///
    /// Concurrent calls for the same key share one in-flight fetch. The
    /// fetch runs on its own task, so its result lands in the cache even if
    /// every caller stops waiting. Failures are retried per `options` and
    /// the config, then stored in the error slot without discarding an
    /// earlier value.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> ApiResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let fetch = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();

            if !should_refetch(entry, options.stale_time, Instant::now()) {
                if let Some(value) = &entry.value {
                    tracing::trace!(key = %key, "Cache hit");
                    return downcast(value.clone(), &key);
                }
            }

            match &entry.in_flight {
                Some(in_flight) if in_flight.generation == entry.generation => {
                    tracing::debug!(key = %key, "Joining in-flight fetch");
                    in_flight.fetch.clone()
                }
                // A fetch started before the latest invalidation is replaced;
                // `settle` drops its result once it is no longer current.
                _ => {
                    if entry.in_flight.is_some() {
                        tracing::debug!(key = %key, "Restarting fetch after invalidation");
                    }
                    let retries = options.retry.unwrap_or(self.inner.config.retry);
                    let in_flight = self.start_fetch(key.clone(), entry.generation, retries, fetcher);
                    let fetch = in_flight.fetch.clone();
                    entry.in_flight = Some(in_flight);
                    fetch
                }
            }
        };

        let value = fetch.await?;
        downcast(value, &key)
    }

    /// Run a mutation once. On success, apply the effects derived from its
    /// result; on failure, leave the cache untouched.
    pub async fn mutate<T, Fut, E>(&self, mutation: Fut, effects: E) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
        E: FnOnce(&T) -> Vec<CacheEffect>,
    {
        let value = mutation.await.map_err(|e| {
            tracing::debug!(error = %e, "Mutation failed, cache unchanged");
            e
        })?;
        for effect in effects(&value) {
            self.apply(effect);
        }
        Ok(value)
    }

    pub fn apply(&self, effect: CacheEffect) {
        match effect {
            CacheEffect::Seed { key, value } => self.seed(key, value),
            CacheEffect::Remove(key) => {
                self.remove_query(&key);
            }
            CacheEffect::Invalidate(prefix) => {
                self.invalidate_queries(&prefix);
            }
        }
    }

    /// Store `value` at `key` as freshly fetched.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.seed(key, Arc::new(value));
    }

    /// The cached value at `key`, regardless of staleness.
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.lock().get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().get(key).is_some_and(CacheEntry::has_value)
    }

    /// Whether a read of `key` now would hit the network.
    pub fn is_stale(&self, key: &QueryKey, stale_time: StaleTime) -> bool {
        self.lock()
            .get(key)
            .map_or(true, |entry| should_refetch(entry, stale_time, Instant::now()))
    }

    /// Both slots of the entry at `key`.
    pub fn query_state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) => QueryState {
                data: entry.value.clone().and_then(|v| v.downcast::<T>().ok()),
                error: entry.error.clone(),
                is_fetching: entry.is_fetching(),
                is_invalidated: entry.invalidated,
            },
            None => QueryState {
                data: None,
                error: None,
                is_fetching: false,
                is_invalidated: false,
            },
        }
    }

    /// Mark every entry under `prefix` stale. Returns how many entries
    /// were affected.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let count = {
            let mut entries = self.lock();
            let mut count = 0;
            for (_, entry) in entries.iter_mut().filter(|(k, _)| k.starts_with(prefix)) {
                entry.invalidate();
                count += 1;
            }
            count
        };
        tracing::debug!(prefix = %prefix, count, "Invalidated queries");
        self.publish(CacheEvent::Invalidated(prefix.clone()));
        count
    }

    /// Drop the entry at exactly `key`. Returns whether one existed.
    pub fn remove_query(&self, key: &QueryKey) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            tracing::debug!(key = %key, "Removed query");
            self.publish(CacheEvent::Removed(key.clone()));
        }
        removed
    }

    // ---- private helpers ----

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, event: CacheEvent) {
        // A send error only means nobody is subscribed.
        let _ = self.inner.events.send(event);
    }

    fn seed(&self, key: QueryKey, value: AnyValue) {
        {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();
            entry.value = Some(value);
            entry.error = None;
            entry.updated_at = Some(Instant::now());
            entry.invalidated = false;
            entry.generation += 1;
        }
        tracing::debug!(key = %key, "Seeded query");
        self.publish(CacheEvent::Updated(key));
    }

    fn start_fetch<T, F, Fut>(&self, key: QueryKey, generation: u64, retries: u32, fetcher: F) -> InFlight
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let policy = RetryPolicy::from_config(&self.inner.config, retries);
        tracing::debug!(key = %key, fetch_id = id, "Fetching query");

        let client = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = run_with_retry(&task_key, &policy, || fetcher())
                .await
                .map(|value| Arc::new(value) as AnyValue);
            client.settle(&task_key, id, &result);
            result
        });

        let client = self.clone();
        let fetch = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let result = Err(ApiError::Internal(format!("fetch task failed: {e}")));
                    client.settle(&key, id, &result);
                    result
                }
            }
        }
        .boxed()
        .shared();

        InFlight {
            id,
            generation,
            fetch,
        }
    }

    /// Apply the outcome of fetch `fetch_id` to the entry at `key`.
    ///
    /// Results for a removed entry, or for a fetch that is no longer the
    /// entry's current one, are dropped. A value that arrives after an
    /// invalidation is stored but the entry stays stale; one that arrives
    /// after a seed is discarded in favour of the seeded value.
    fn settle(&self, key: &QueryKey, fetch_id: u64, result: &ApiResult<AnyValue>) {
        let event = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(key) else {
                tracing::debug!(key = %key, fetch_id, "Discarding result for removed query");
                return;
            };
            let started_generation = match entry.in_flight.take() {
                Some(in_flight) if in_flight.id == fetch_id => in_flight.generation,
                other => {
                    entry.in_flight = other;
                    return;
                }
            };

            match result {
                Ok(value) => {
                    let superseded = entry.generation != started_generation;
                    if superseded && !entry.invalidated {
                        tracing::debug!(key = %key, fetch_id, "Discarding result superseded by a seed");
                        return;
                    }
                    entry.value = Some(value.clone());
                    entry.error = None;
                    entry.updated_at = Some(Instant::now());
                    entry.invalidated = superseded;
                    CacheEvent::Updated(key.clone())
                }
                Err(error) => {
                    entry.error = Some(error.clone());
                    CacheEvent::Failed {
                        key: key.clone(),
                        error: error.clone(),
                    }
                }
            }
        };
        self.publish(event);
    }
}

fn downcast<T: Send + Sync + 'static>(value: AnyValue, key: &QueryKey) -> ApiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| ApiError::Internal(format!("cached value for {key} has an unexpected type")))
}
