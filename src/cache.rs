//! # Query Cache
//!
//! Client-side cache of fetched collections, owned by a single actor.
//!
//! Entries are keyed by [`CollectionKey`]. Mutations call
//! [`QueryCache::invalidate`], which marks the entry stale and notifies every
//! subscriber of that key so mounted listings can refetch.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    Services,
    Categories,
    Orders,
    Users,
}

impl CollectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Services => "services",
            CollectionKey::Categories => "categories",
            CollectionKey::Orders => "orders",
            CollectionKey::Users => "users",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Callback = Arc<dyn Fn(CollectionKey) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Snapshot of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStatus {
    pub cached: bool,
    pub stale: bool,
    pub version: u64,
    pub subscribers: usize,
}

type Respond<T> = oneshot::Sender<T>;

enum CacheRequest {
    Get { key: CollectionKey, respond_to: Respond<(Option<Value>, u64)> },
    Put { key: CollectionKey, value: Value, version: u64, respond_to: Respond<bool> },
    Invalidate { key: CollectionKey, respond_to: Respond<()> },
    Subscribe { key: CollectionKey, callback: Callback, respond_to: Respond<SubscriptionId> },
    Unsubscribe { id: SubscriptionId, respond_to: Respond<bool> },
    Status { key: CollectionKey, respond_to: Respond<EntryStatus> },
}

#[derive(Default)]
struct Entry {
    value: Option<Value>,
    stale: bool,
    version: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

pub struct CacheActor {
    receiver: mpsc::Receiver<CacheRequest>,
    entries: HashMap<CollectionKey, Entry>,
    next_subscription: u64,
}

impl CacheActor {
    pub async fn run(mut self) {
        debug!("Query cache starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CacheRequest::Get { key, respond_to } => {
                    let entry = self.entries.entry(key).or_default();
                    let value = if entry.stale { None } else { entry.value.clone() };
                    let _ = respond_to.send((value, entry.version));
                }
                CacheRequest::Put { key, value, version, respond_to } => {
                    let entry = self.entries.entry(key).or_default();
                    // An invalidation raced the fetch; keep the entry stale.
                    let stored = entry.version == version;
                    if stored {
                        entry.value = Some(value);
                        entry.stale = false;
                    }
                    let _ = respond_to.send(stored);
                }
                CacheRequest::Invalidate { key, respond_to } => {
                    let entry = self.entries.entry(key).or_default();
                    entry.stale = true;
                    entry.version += 1;
                    debug!(key = %key, version = entry.version, subscribers = entry.subscribers.len(), "Collection invalidated");
                    for (_, callback) in &entry.subscribers {
                        callback(key);
                    }
                    let _ = respond_to.send(());
                }
                CacheRequest::Subscribe { key, callback, respond_to } => {
                    self.next_subscription += 1;
                    let id = SubscriptionId(self.next_subscription);
                    self.entries.entry(key).or_default().subscribers.push((id, callback));
                    let _ = respond_to.send(id);
                }
                CacheRequest::Unsubscribe { id, respond_to } => {
                    let mut removed = false;
                    for entry in self.entries.values_mut() {
                        let before = entry.subscribers.len();
                        entry.subscribers.retain(|(existing, _)| *existing != id);
                        removed |= entry.subscribers.len() != before;
                    }
                    let _ = respond_to.send(removed);
                }
                CacheRequest::Status { key, respond_to } => {
                    let status = match self.entries.get(&key) {
                        Some(entry) => EntryStatus {
                            cached: entry.value.is_some(),
                            stale: entry.stale,
                            version: entry.version,
                            subscribers: entry.subscribers.len(),
                        },
                        None => EntryStatus { cached: false, stale: false, version: 0, subscribers: 0 },
                    };
                    let _ = respond_to.send(status);
                }
            }
        }
        debug!("Query cache stopped");
    }
}

/// Handle to the cache actor.
#[derive(Clone)]
pub struct QueryCache {
    sender: mpsc::Sender<CacheRequest>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache").finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new(buffer_size: usize) -> (CacheActor, QueryCache) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = CacheActor { receiver, entries: HashMap::new(), next_subscription: 0 };
        (actor, QueryCache { sender })
    }

    /// Starts the actor on the current runtime and returns its handle.
    pub fn spawn(buffer_size: usize) -> (QueryCache, tokio::task::JoinHandle<()>) {
        let (actor, cache) = Self::new(buffer_size);
        (cache, tokio::spawn(actor.run()))
    }

    async fn request<R>(&self, build: impl FnOnce(Respond<R>) -> CacheRequest) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(build(respond_to)).await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    /// Returns the cached collection, fetching it when missing or stale.
    ///
    /// If the cache actor is gone the fetch still runs, uncached.
    #[instrument(skip(self, fetch))]
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: CollectionKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let version = match self.request(|respond_to| CacheRequest::Get { key, respond_to }).await {
            Ok((Some(value), version)) => match serde_json::from_value::<T>(value) {
                Ok(cached) => {
                    debug!("Cache hit");
                    return Ok(cached);
                }
                Err(e) => {
                    warn!(error = %e, "Cached value has an unexpected shape, refetching");
                    Some(version)
                }
            },
            Ok((None, version)) => Some(version),
            Err(e) => {
                warn!(error = %e, "Query cache unavailable, fetching uncached");
                None
            }
        };

        debug!("Cache miss, fetching");
        let fresh = fetch().await?;

        if let Some(version) = version {
            match serde_json::to_value(&fresh) {
                Ok(value) => {
                    if let Err(e) = self.request(|respond_to| CacheRequest::Put { key, value, version, respond_to }).await {
                        warn!(error = %e, "Failed to store fetched collection");
                    }
                }
                Err(e) => warn!(error = %e, "Fetched collection is not cacheable"),
            }
        }
        Ok(fresh)
    }

    /// Marks `key` stale and notifies its subscribers.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, key: CollectionKey) {
        if let Err(e) = self.request(|respond_to| CacheRequest::Invalidate { key, respond_to }).await {
            warn!(error = %e, "Failed to invalidate collection");
        }
    }

    /// Registers `callback` to run whenever `key` is invalidated.
    pub async fn subscribe(
        &self,
        key: CollectionKey,
        callback: impl Fn(CollectionKey) + Send + Sync + 'static,
    ) -> Result<SubscriptionId, FrameworkError> {
        let callback: Callback = Arc::new(callback);
        self.request(|respond_to| CacheRequest::Subscribe { key, callback, respond_to }).await
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, FrameworkError> {
        self.request(|respond_to| CacheRequest::Unsubscribe { id, respond_to }).await
    }

    pub async fn status(&self, key: CollectionKey) -> Result<EntryStatus, FrameworkError> {
        self.request(|respond_to| CacheRequest::Status { key, respond_to }).await
    }

    /// Number of invalidations `key` has seen.
    pub async fn version(&self, key: CollectionKey) -> Result<u64, FrameworkError> {
        Ok(self.status(key).await?.version)
    }

    pub async fn is_stale(&self, key: CollectionKey) -> bool {
        self.status(key).await.map(|s| s.stale || !s.cached).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn fetch_counted(calls: &AtomicUsize, items: Vec<String>) -> Result<Vec<String>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(items)
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_until_invalidated() {
        let (cache, _handle) = QueryCache::spawn(16);
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch(CollectionKey::Orders, || fetch_counted(&calls, vec!["o1".into()]))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(CollectionKey::Orders, || fetch_counted(&calls, vec!["o2".into()]))
            .await
            .unwrap();
        assert_eq!(first, vec!["o1".to_string()]);
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_stale(CollectionKey::Orders).await);

        cache.invalidate(CollectionKey::Orders).await;
        assert!(cache.is_stale(CollectionKey::Orders).await);

        let third = cache
            .get_or_fetch(CollectionKey::Orders, || fetch_counted(&calls, vec!["o3".into()]))
            .await
            .unwrap();
        assert_eq!(third, vec!["o3".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_not_cached() {
        let (cache, _handle) = QueryCache::spawn(16);
        let failed: Result<Vec<String>, String> = cache
            .get_or_fetch(CollectionKey::Users, || async { Err("boom".to_string()) })
            .await;
        assert_eq!(failed, Err("boom".to_string()));

        let status = cache.status(CollectionKey::Users).await.unwrap();
        assert!(!status.cached);
    }

    #[tokio::test]
    async fn test_invalidate_notifies_only_matching_subscribers() {
        let (cache, _handle) = QueryCache::spawn(16);
        let order_hits = Arc::new(AtomicUsize::new(0));
        let user_hits = Arc::new(AtomicUsize::new(0));

        let counter = order_hits.clone();
        let sub = cache
            .subscribe(CollectionKey::Orders, move |key| {
                assert_eq!(key, CollectionKey::Orders);
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        let counter = user_hits.clone();
        cache
            .subscribe(CollectionKey::Users, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        cache.invalidate(CollectionKey::Orders).await;
        assert_eq!(order_hits.load(Ordering::SeqCst), 1);
        assert_eq!(user_hits.load(Ordering::SeqCst), 0);

        assert!(cache.unsubscribe(sub).await.unwrap());
        cache.invalidate(CollectionKey::Orders).await;
        assert_eq!(order_hits.load(Ordering::SeqCst), 1);
        assert_eq!(cache.version(CollectionKey::Orders).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_closed_cache_still_fetches() {
        let (actor, cache) = QueryCache::new(4);
        drop(actor);

        let fetched: Result<Vec<u32>, String> =
            cache.get_or_fetch(CollectionKey::Services, || async { Ok(vec![1, 2]) }).await;
        assert_eq!(fetched, Ok(vec![1, 2]));
        assert!(cache.is_stale(CollectionKey::Services).await);
    }
}
