//! In-process cache for geocoding results.
//!
//! Bounded by entry count and expiring by a fixed TTL. Expiry is checked
//! lazily on read; a background task ([`spawn_cleanup`]) sweeps entries that
//! expire without ever being read again so they don't sit in memory.
//!
//! Eviction order is insertion order, with a hit moving the entry to the
//! newest position. That approximates LRU closely enough for a read-heavy
//! workload over a small hot set of postal codes and addresses.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::geo::{GeoLocation, Source};

/// Default TTL: 24 hours.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default sweep interval: one hour.
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Configuration for the geocode cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: usize,

    /// How often the background sweep runs.
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set the background sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: 1000,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

/// Cache key: a content hash of the normalized query, namespaced by kind.
///
/// Normalization trims and lower-cases, so `" 1011 AB"` and `"1011 ab"`
/// share a key. The namespace keeps a postal lookup and an address lookup
/// of the same text apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a postal-code query.
    pub fn postal(query: &str) -> Self {
        Self::namespaced("postal", query)
    }

    /// Key for a free-form address query.
    pub fn address(query: &str) -> Self {
        Self::namespaced("address", query)
    }

    fn namespaced(kind: &str, query: &str) -> Self {
        let normalized = query.trim().to_lowercase();
        let digest = Sha256::digest(normalized.as_bytes());
        Self(format!("{kind}:{}", hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before any lookups.
    pub hit_rate: f64,
}

/// Stored value. Never leaves the cache.
#[derive(Debug)]
struct CacheEntry {
    location: GeoLocation,
    expires_at: Instant,
    /// Position in the eviction order.
    seq: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Eviction order: lowest sequence number is oldest.
    order: BTreeMap<u64, CacheKey>,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

impl CacheInner {
    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> bool {
        match self.order.pop_first() {
            Some((_, key)) => {
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// Bounded TTL cache of geocoding results.
///
/// Internally synchronised; share it behind an `Arc`. The lock is never
/// held across an await point.
#[derive(Debug)]
pub struct GeoCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    max_capacity: usize,
}

impl GeoCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            ttl: config.ttl,
            max_capacity: config.max_capacity,
        }
    }

    /// Look up a cached location.
    ///
    /// Expired entries are dropped and reported as a miss. A hit moves the
    /// entry to the newest position and returns a copy tagged
    /// [`Source::Cache`].
    pub fn get(&self, key: &CacheKey) -> Option<GeoLocation> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let expired = inner.entries.get(key).map(|entry| now >= entry.expires_at);
        match expired {
            None => {
                inner.misses += 1;
                return None;
            }
            Some(true) => {
                inner.remove(key);
                inner.misses += 1;
                return None;
            }
            Some(false) => {}
        }

        inner.hits += 1;
        let seq = inner.bump_seq();
        let CacheInner { entries, order, .. } = &mut *inner;
        let entry = entries.get_mut(key)?;
        order.remove(&entry.seq);
        order.insert(seq, key.clone());
        entry.seq = seq;

        Some(entry.location.with_source(Source::Cache))
    }

    /// Insert a location, evicting the oldest entries if at capacity.
    pub fn set(&self, key: CacheKey, location: GeoLocation) {
        if self.max_capacity == 0 {
            return;
        }

        let expires_at = Instant::now() + self.ttl;
        let mut inner = self.inner.lock();

        inner.remove(&key);
        while inner.entries.len() >= self.max_capacity {
            if !inner.evict_oldest() {
                break;
            }
        }

        let seq = inner.bump_seq();
        inner.order.insert(seq, key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                location,
                expires_at,
                seq,
            },
        );
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let expired: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| now >= entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }

        expired.len()
    }

    /// Drop all entries. Hit and miss counters are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let lookups = inner.hits + inner.misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            inner.hits as f64 / lookups as f64
        };

        CacheStats {
            size: inner.entries.len(),
            max_size: self.max_capacity,
            hits: inner.hits,
            misses: inner.misses,
            hit_rate,
        }
    }

    /// Number of stored entries (expired ones included until swept).
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to the periodic cache sweep.
///
/// Owned by whoever spawned it; [`CleanupTask::shutdown`] stops the loop and
/// waits for it to exit.
#[derive(Debug)]
pub struct CleanupTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Stop the sweep and wait for the task to finish.
    pub async fn shutdown(self) {
        // The receiver is gone only if the task already exited
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            debug!(error = %e, "cache cleanup task ended abnormally");
        }
    }
}

/// Spawn a task that calls [`GeoCache::cleanup`] every `interval`.
pub fn spawn_cleanup(cache: Arc<GeoCache>, interval: Duration) -> CleanupTask {
    let (stop, mut stopped) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // First tick is immediate, skip it
        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticker.tick() => {
                    let removed = cache.cleanup();
                    if removed > 0 {
                        info!(removed, remaining = cache.len(), "swept expired geocode cache entries");
                    } else {
                        debug!("geocode cache sweep found nothing to remove");
                    }
                }
            }
        }
    });

    CleanupTask { stop, handle }
}
