// src/services/query/query_cache.rs
//
// Request-deduplicating, time-based cache for read-heavy remote queries.
//
// RULES:
// - Fresh data (younger than `stale_time`) is served without fetching
// - Concurrent fetches of one key share a single request and its result
// - Failures are retried per `RetryPolicy`, then stored in state; they
//   are never returned as `Err`
// - Entries nobody observes are evicted after `gc_time`

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::retry_policy::{ErrorClassifier, ErrorKind, MessagePatternClassifier, RetryPolicy};
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Age after which data is considered stale
    pub stale_time: Duration,

    /// How long an unobserved entry stays in memory
    pub gc_time: Duration,

    /// Refetch stale data when a consumer mounts. Off: stale data is served
    /// until a reconnect, an invalidation or an explicit refetch.
    pub refetch_on_mount: bool,
    pub refetch_on_window_focus: bool,
    pub refetch_on_reconnect: bool,

    pub retry: RetryPolicy,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(10 * 60),
            refetch_on_mount: false,
            refetch_on_window_focus: false,
            refetch_on_reconnect: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Hierarchical query key, e.g. `["movie", "popular", "en-US", "1"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Never fetched
    Idle,
    /// First fetch in flight, no data yet
    Loading,
    Success,
    Error,
}

/// Failure captured in query state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryError {
    pub kind: ErrorKind,
    pub message: String,
}

pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<QueryError>,
    /// Consecutive failures of the latest fetch
    pub failure_count: u32,
    pub is_fetching: bool,
    pub data_updated_at: Option<Instant>,
    /// Wall-clock time of `data_updated_at`, for display
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryState<T> {
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            failure_count: 0,
            is_fetching: false,
            data_updated_at: None,
            updated_at: None,
        }
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            failure_count: self.failure_count,
            is_fetching: self.is_fetching,
            data_updated_at: self.data_updated_at,
            updated_at: self.updated_at,
        }
    }
}

impl<T> fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("status", &self.status)
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("failure_count", &self.failure_count)
            .field("is_fetching", &self.is_fetching)
            .finish()
    }
}

struct QueryEntry<T> {
    state: QueryState<T>,
    observers: usize,
    last_used: Instant,
    /// Bumped every time a fetch settles
    generation: u64,
    invalidated: bool,
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<T> QueryEntry<T> {
    fn new(now: Instant) -> Self {
        Self {
            state: QueryState::default(),
            observers: 0,
            last_used: now,
            generation: 0,
            invalidated: false,
            fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn is_stale(&self, stale_time: Duration, now: Instant) -> bool {
        if self.invalidated {
            return true;
        }
        match self.state.data_updated_at {
            Some(at) => now.saturating_duration_since(at) >= stale_time,
            None => true,
        }
    }
}

/// Undoes the in-flight markers when a fetch is dropped before settling.
struct FetchInFlight<'a, T> {
    inner: &'a CacheInner<T>,
    key: &'a QueryKey,
    settled: bool,
}

impl<T> Drop for FetchInFlight<'_, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Some(entry) = self.inner.entries().get_mut(self.key) {
            entry.state.is_fetching = false;
            if entry.state.data.is_none() {
                entry.state.status = QueryStatus::Idle;
            }
            entry.last_used = Instant::now();
        }
        log::debug!("Query {} fetch dropped before settling", self.key);
    }
}

struct CacheInner<T> {
    entries: Mutex<HashMap<QueryKey, QueryEntry<T>>>,
    options: QueryOptions,
    classifier: Arc<dyn ErrorClassifier>,
}

impl<T> CacheInner<T> {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, QueryEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle; clones see the same entries.
pub struct QueryCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Keeps a query "mounted" while alive.
pub struct QueryObserver<T> {
    inner: Arc<CacheInner<T>>,
    key: QueryKey,
}

impl<T> QueryObserver<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        let mut entries = self.inner.entries();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.observers = entry.observers.saturating_sub(1);
            entry.last_used = Instant::now();
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(options: QueryOptions) -> Self {
        Self::with_classifier(options, Arc::new(MessagePatternClassifier::new()))
    }

    pub fn with_classifier(options: QueryOptions, classifier: Arc<dyn ErrorClassifier>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                options,
                classifier,
            }),
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.inner.options
    }

    /// Current state of `key` without triggering a fetch.
    pub fn state(&self, key: &QueryKey) -> QueryState<T> {
        self.inner
            .entries()
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries().contains_key(key)
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.inner.entries().get(key).map(|e| e.observers).unwrap_or(0)
    }

    /// Registers a consumer of `key`; the entry is pinned until the
    /// returned observer is dropped.
    pub fn observe(&self, key: &QueryKey) -> QueryObserver<T> {
        let now = Instant::now();
        let mut entries = self.inner.entries();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| QueryEntry::new(now));
        entry.observers += 1;
        entry.last_used = now;

        QueryObserver {
            inner: Arc::clone(&self.inner),
            key: key.clone(),
        }
    }

    /// Serves cached data when it may be served, fetches otherwise.
    ///
    /// Data is served as-is while fresh, or while stale when
    /// `refetch_on_mount` is off.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryState<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let now = Instant::now();
        let (lock, generation) = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| QueryEntry::new(now));
            entry.last_used = now;

            let has_data = entry.state.data.is_some();
            let stale = entry.is_stale(self.inner.options.stale_time, now);
            if has_data && (!stale || (!self.inner.options.refetch_on_mount && !entry.invalidated)) {
                log::debug!("Query {} served from cache", key);
                return entry.state.clone();
            }
            (Arc::clone(&entry.fetch_lock), entry.generation)
        };

        self.run_fetch(key, lock, generation, fetcher).await
    }

    /// Fetches regardless of freshness. An in-flight fetch is joined, not
    /// cancelled.
    pub async fn refetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryState<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let now = Instant::now();
        let (lock, generation) = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| QueryEntry::new(now));
            entry.last_used = now;

            // A fetch settling before we get the lock is joined, not repeated
            (Arc::clone(&entry.fetch_lock), entry.generation)
        };

        self.run_fetch(key, lock, generation, fetcher).await
    }

    async fn run_fetch<F, Fut>(
        &self,
        key: &QueryKey,
        lock: Arc<tokio::sync::Mutex<()>>,
        seen_generation: u64,
        fetcher: F,
    ) -> QueryState<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let _guard = lock.lock().await;

        {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| QueryEntry::new(Instant::now()));

            // Another caller fetched while we waited: share its result.
            if entry.generation != seen_generation {
                log::debug!("Query {} joined an in-flight fetch", key);
                return entry.state.clone();
            }

            entry.state.is_fetching = true;
            entry.state.failure_count = 0;
            if entry.state.data.is_none() {
                entry.state.status = QueryStatus::Loading;
            }
        }

        let mut in_flight = FetchInFlight {
            inner: &*self.inner,
            key,
            settled: false,
        };
        let policy = &self.inner.options.retry;
        let mut failure_count: u32 = 0;

        loop {
            match fetcher().await {
                Ok(data) => {
                    let now = Instant::now();
                    let mut entries = self.inner.entries();
                    let entry = entries
                        .entry(key.clone())
                        .or_insert_with(|| QueryEntry::new(now));

                    entry.state.status = QueryStatus::Success;
                    entry.state.data = Some(Arc::new(data));
                    entry.state.error = None;
                    entry.state.failure_count = 0;
                    entry.state.is_fetching = false;
                    entry.state.data_updated_at = Some(now);
                    entry.state.updated_at = Some(Utc::now());
                    entry.generation = entry.generation.wrapping_add(1);
                    entry.invalidated = false;
                    entry.last_used = now;
                    in_flight.settled = true;

                    log::debug!("Query {} fetched", key);
                    return entry.state.clone();
                }
                Err(err) => {
                    let kind = self.inner.classifier.classify(&err);
                    let retry = policy.should_retry(failure_count, kind);
                    let delay = policy.retry_delay(failure_count);
                    failure_count += 1;

                    let settled = {
                        let mut entries = self.inner.entries();
                        let entry = entries
                            .entry(key.clone())
                            .or_insert_with(|| QueryEntry::new(Instant::now()));
                        entry.state.failure_count = failure_count;

                        if retry {
                            None
                        } else {
                            entry.state.status = QueryStatus::Error;
                            entry.state.error = Some(QueryError {
                                kind,
                                message: err.to_string(),
                            });
                            entry.state.is_fetching = false;
                            entry.generation = entry.generation.wrapping_add(1);
                            entry.last_used = Instant::now();
                            in_flight.settled = true;
                            Some(entry.state.clone())
                        }
                    };

                    match settled {
                        Some(state) => {
                            log::warn!(
                                "Query {} failed after {} attempts: {}",
                                key,
                                failure_count,
                                err
                            );
                            return state;
                        }
                        None => {
                            log::debug!(
                                "Query {} failed ({:?}, attempt {}): {}; retrying in {:?}",
                                key,
                                kind,
                                failure_count,
                                err,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }
    }

    /// Marks `key` stale so the next `fetch` goes to the network.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.inner.entries().get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Observed, stale keys to refetch after connectivity returns.
    pub fn keys_to_refetch_on_reconnect(&self) -> Vec<QueryKey> {
        if !self.inner.options.refetch_on_reconnect {
            return Vec::new();
        }
        self.active_stale_keys()
    }

    /// Observed, stale keys to refetch when the app regains focus.
    pub fn keys_to_refetch_on_focus(&self) -> Vec<QueryKey> {
        if !self.inner.options.refetch_on_window_focus {
            return Vec::new();
        }
        self.active_stale_keys()
    }

    fn active_stale_keys(&self) -> Vec<QueryKey> {
        let now = Instant::now();
        let stale_time = self.inner.options.stale_time;
        self.inner
            .entries()
            .iter()
            .filter(|(_, e)| e.observers > 0 && !e.state.is_fetching && e.is_stale(stale_time, now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Evicts entries unobserved and unused for `gc_time`. Returns how many.
    pub fn collect_garbage(&self, now: Instant) -> usize {
        let gc_time = self.inner.options.gc_time;
        let mut entries = self.inner.entries();
        let before = entries.len();

        entries.retain(|key, entry| {
            let keep = entry.observers > 0
                || entry.state.is_fetching
                || now.saturating_duration_since(entry.last_used) < gc_time;
            if !keep {
                log::debug!("Query {} evicted", key);
            }
            keep
        });

        before - entries.len()
    }

    /// Runs [`collect_garbage`](Self::collect_garbage) every `every` until aborted.
    pub fn spawn_gc_task(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = cache.collect_garbage(Instant::now());
                if evicted > 0 {
                    log::debug!("Query cache sweep evicted {} entries", evicted);
                }
            }
        })
    }

    pub fn clear(&self) {
        self.inner.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key() -> QueryKey {
        QueryKey::new(["movie", "popular", "en-US", "1"])
    }

    fn options() -> QueryOptions {
        QueryOptions {
            retry: RetryPolicy::immediate(),
            ..QueryOptions::default()
        }
    }

    /// Fetcher returning 1, 2, 3... and counting its calls.
    fn counting(calls: &AtomicU32) -> impl Fn() -> std::future::Ready<AppResult<u32>> + '_ {
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    /// Fetcher that always fails with `message`.
    fn failing<'a>(
        calls: &'a AtomicU32,
        message: &'a str,
    ) -> impl Fn() -> std::future::Ready<AppResult<u32>> + 'a {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err(AppError::Other(message.to_string())))
        }
    }

    #[test]
    fn test_key_display() {
        assert_eq!(key().to_string(), "[movie, popular, en-US, 1]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_data_is_served_without_refetch() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);

        let first = cache.fetch(&key(), counting(&calls)).await;
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = cache.fetch(&key(), counting(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.data.as_deref(), Some(&1));
        assert_eq!(second.data.as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_data_is_refetched_when_refetch_on_mount_enabled() {
        let cache: QueryCache<u32> = QueryCache::new(QueryOptions {
            refetch_on_mount: true,
            ..options()
        });
        let calls = AtomicU32::new(0);

        cache.fetch(&key(), counting(&calls)).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        let state = cache.fetch(&key(), counting(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.data.as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_data_served_by_default() {
        let cache: QueryCache<u32> = QueryCache::new(QueryOptions::default());
        let calls = AtomicU32::new(0);

        cache.fetch(&key(), counting(&calls)).await;
        tokio::time::advance(Duration::from_secs(120)).await;
        cache.fetch(&key(), counting(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_share_one_request() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let slow = move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<u32, AppError>(42)
        };

        let k = key();
        let (a, b, c) = tokio::join!(
            cache.fetch(&k, slow),
            cache.fetch(&k, slow),
            cache.refetch(&k, slow),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for state in [a, b, c] {
            assert!(state.is_success());
            assert_eq!(state.data.as_deref(), Some(&42));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_retried_three_times_then_captured() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);

        let state = cache
            .fetch(&key(), failing(&calls, "Network request failed"))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(state.is_error());
        assert_eq!(state.failure_count, 4);
        assert!(!state.is_fetching);
        let error = state.error.unwrap();
        assert_eq!(error.kind, ErrorKind::Network);
        assert!(error.message.contains("Network request failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_retried_twice() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);

        let state = cache.fetch(&key(), failing(&calls, "Unexpected token")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.error.unwrap().kind, ErrorKind::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_within_retry_budget() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        let flaky = || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n < 2 {
                Err(AppError::network_request_failed("offline"))
            } else {
                Ok(7)
            })
        };

        let state = cache.fetch(&key(), flaky).await;

        assert!(state.is_success());
        assert_eq!(state.failure_count, 0);
        assert_eq!(state.data.as_deref(), Some(&7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_with_backoff() {
        let cache: QueryCache<u32> = QueryCache::new(QueryOptions::default());
        let calls = AtomicU32::new(0);

        let started = Instant::now();
        cache.fetch(&key(), failing(&calls, "boom")).await;

        // 1s + 2s before the two retries
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_previous_data() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        cache.fetch(&key(), counting(&calls)).await;

        let state = cache.refetch(&key(), failing(&calls, "x")).await;

        assert!(state.is_error());
        assert_eq!(state.data.as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_ignores_freshness() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);

        cache.fetch(&key(), counting(&calls)).await;
        let state = cache.refetch(&key(), counting(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.data.as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_fetch_releases_entry() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let k = key();
        let observer = cache.observe(&k);

        let timed_out = tokio::time::timeout(
            Duration::from_secs(1),
            cache.fetch(&k, || std::future::pending::<AppResult<u32>>()),
        )
        .await;
        assert!(timed_out.is_err());

        let state = cache.state(&k);
        assert_eq!(state.status, QueryStatus::Idle);
        assert!(!state.is_fetching);
        assert_eq!(cache.keys_to_refetch_on_reconnect(), vec![k.clone()]);

        drop(observer);
        tokio::time::advance(Duration::from_secs(60 * 60)).await;
        assert_eq!(cache.collect_garbage(Instant::now()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_fetch_does_not_block_next_fetch() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);

        let _ = tokio::time::timeout(
            Duration::from_millis(10),
            cache.fetch(&key(), || std::future::pending::<AppResult<u32>>()),
        )
        .await;
        let state = cache.fetch(&key(), counting(&calls)).await;

        assert!(state.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_fetch() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);

        cache.fetch(&key(), counting(&calls)).await;
        cache.invalidate(&key());
        cache.fetch(&key(), counting(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_evicts_only_unobserved_entries() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        let observed = QueryKey::new(["a"]);
        let unobserved = QueryKey::new(["b"]);

        let _observer = cache.observe(&observed);
        cache.fetch(&observed, counting(&calls)).await;
        cache.fetch(&unobserved, counting(&calls)).await;

        tokio::time::advance(Duration::from_secs(9 * 60)).await;
        assert_eq!(cache.collect_garbage(Instant::now()), 0);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.collect_garbage(Instant::now()), 1);
        assert!(cache.contains(&observed));
        assert!(!cache.contains(&unobserved));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_window_starts_when_last_observer_leaves() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        let k = key();

        let observer = cache.observe(&k);
        cache.fetch(&k, counting(&calls)).await;
        tokio::time::advance(Duration::from_secs(30 * 60)).await;
        drop(observer);
        assert_eq!(cache.observer_count(&k), 0);

        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert_eq!(cache.collect_garbage(Instant::now()), 0);
        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert_eq!(cache.collect_garbage(Instant::now()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_and_focus_policies() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        let k = key();
        let _observer = cache.observe(&k);
        cache.fetch(&k, counting(&calls)).await;

        // Fresh: nothing to do
        assert!(cache.keys_to_refetch_on_reconnect().is_empty());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.keys_to_refetch_on_reconnect(), vec![k.clone()]);
        assert!(cache.keys_to_refetch_on_focus().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_task_sweeps_in_background() {
        let cache: QueryCache<u32> = QueryCache::new(options());
        let calls = AtomicU32::new(0);
        cache.fetch(&key(), counting(&calls)).await;

        let handle = cache.spawn_gc_task(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(11 * 60)).await;
        assert!(!cache.contains(&key()));
        handle.abort();
    }
}
