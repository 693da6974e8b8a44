//! Two-tier cache of stitched routes, keyed by source coordinate.
//!
//! The session tier lives as long as the cache value and never expires. The
//! persistent tier stores [`CacheEntry`] text under `CACHE_PREFIX + key` and
//! drops entries older than the TTL on read. Storage faults on either path
//! are logged and treated as a miss, they never reach the caller.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use model::{CoordinateKey, Route};
use tokio::sync::{Mutex, RwLock};

use crate::{entry::CacheEntry, store::PersistentStore};

pub const CACHE_PREFIX: &str = "trajectory_";
pub const DEFAULT_TTL_HOURS: i64 = 24;

type PendingFetch<E> = Shared<BoxFuture<'static, Result<Route, E>>>;

pub struct TrajectoryCache<E> {
    session: RwLock<HashMap<CoordinateKey, Route>>,
    store: Box<dyn PersistentStore>,
    ttl: Duration,
    in_flight: Mutex<HashMap<CoordinateKey, PendingFetch<E>>>,
}

impl<E> TrajectoryCache<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub fn new(store: Box<dyn PersistentStore>) -> Self {
        Self::with_ttl(store, Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(store: Box<dyn PersistentStore>, ttl: Duration) -> Self {
        Self {
            session: RwLock::new(HashMap::new()),
            store,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn persistent_key(key: &CoordinateKey) -> String {
        format!("{CACHE_PREFIX}{key}")
    }

    pub fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.is_expired(now, self.ttl)
    }

    pub async fn get(&self, key: &CoordinateKey) -> Option<Route> {
        self.get_at(key, Utc::now()).await
    }

    /// Looks up the session tier first, then the persistent tier. A
    /// persistent hit is promoted into the session tier.
    pub async fn get_at(&self, key: &CoordinateKey, now: DateTime<Utc>) -> Option<Route> {
        if let Some(route) = self.session.read().await.get(key) {
            return Some(route.clone());
        }

        let persistent_key = Self::persistent_key(key);
        let text = match self.store.get(&persistent_key).await {
            Ok(text) => text?,
            Err(why) => {
                log::warn!("Error retrieving cached trajectory '{persistent_key}': {why}");
                return None;
            }
        };
        let entry = match CacheEntry::from_text(&text) {
            Ok(entry) => entry,
            Err(why) => {
                log::warn!("Error retrieving cached trajectory '{persistent_key}': {why}");
                return None;
            }
        };
        if self.is_expired(&entry, now) {
            log::debug!("Cached trajectory '{persistent_key}' expired.");
            if let Err(why) = self.store.remove(&persistent_key).await {
                log::warn!("Failed to remove expired trajectory '{persistent_key}': {why}");
            }
            return None;
        }

        log::info!("Retrieved trajectory for {key} from persistent cache.");
        self.session
            .write()
            .await
            .insert(key.clone(), entry.data.clone());
        Some(entry.data)
    }

    pub async fn put(&self, key: &CoordinateKey, route: Route) {
        self.put_at(key, route, Utc::now()).await
    }

    /// Stores the route in both tiers. A failing persistent write leaves the
    /// session tier populated.
    pub async fn put_at(&self, key: &CoordinateKey, route: Route, now: DateTime<Utc>) {
        let persistent_key = Self::persistent_key(key);
        let written = match CacheEntry::new(route.clone(), now).to_text() {
            Ok(text) => self.store.set(&persistent_key, text).await,
            Err(why) => Err(why),
        };
        match written {
            Ok(()) => log::debug!("Cached trajectory '{persistent_key}'."),
            Err(why) => log::warn!("Failed to cache trajectory '{persistent_key}': {why}"),
        }
        self.session.write().await.insert(key.clone(), route);
    }

    /// Empties the session tier and removes every persistent entry under
    /// [`CACHE_PREFIX`]. Fetches already running are not affected. Returns
    /// the number of persistent entries removed.
    pub async fn clear(&self) -> usize {
        self.session.write().await.clear();

        let keys = match self.store.keys().await {
            Ok(keys) => keys,
            Err(why) => {
                log::warn!("Failed to list cached trajectories: {why}");
                return 0;
            }
        };
        let mut removed = 0;
        for key in keys.iter().filter(|key| key.starts_with(CACHE_PREFIX)) {
            match self.store.remove(key).await {
                Ok(()) => removed += 1,
                Err(why) => log::warn!("Failed to remove cached trajectory '{key}': {why}"),
            }
        }
        log::info!("Cleared {removed} cached trajectories.");
        removed
    }

    pub async fn is_fetching(&self, key: &CoordinateKey) -> bool {
        self.in_flight.lock().await.contains_key(key)
    }

    /// Returns the cached route or runs `fetch` to produce it. Concurrent
    /// callers for the same key share one fetch and all receive its result.
    /// Successful results are stored in both tiers once, failures are
    /// handed back without being cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &CoordinateKey, fetch: F) -> Result<Route, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Route, E>> + Send + 'static,
    {
        if let Some(route) = self.get(key).await {
            return Ok(route);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock().await;
            // a fetch may have completed between the lookup and the lock
            if let Some(route) = self.session.read().await.get(key) {
                return Ok(route.clone());
            }
            match in_flight.get(key) {
                Some(pending) => {
                    log::debug!("Joining running fetch for {key}.");
                    pending.clone()
                }
                None => {
                    let pending = fetch().boxed().shared();
                    in_flight.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut in_flight = self.in_flight.lock().await;
        let owns_entry = in_flight
            .get(key)
            .is_some_and(|current| current.ptr_eq(&pending));
        if owns_entry {
            if let Ok(route) = &result {
                self.put(key, route.clone()).await;
            }
            in_flight.remove(key);
        }
        result
    }
}
