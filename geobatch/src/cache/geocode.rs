//! Thread-safe outcome cache keyed by normalized address.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::bounded::BoundedCache;
use crate::provider::GeocodeOutcome;

/// Default maximum number of cached addresses.
pub const CACHE_MAX_SIZE: usize = 10_000;

/// Normalizes an address into a cache key.
///
/// Lowercases, trims, and collapses internal runs of whitespace to a single
/// space, so `"  Jl. Sudirman   1 "` and `"jl. sudirman 1"` share one entry.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit ratio in the range 0.0 - 1.0 (0.0 when nothing was looked up).
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Outcome cache shared by a provider adapter.
///
/// Internally synchronized, so a single adapter may serve concurrent batches.
/// Statistics use atomics and never take the lock.
pub struct GeocodeCache {
    inner: Mutex<BoundedCache<GeocodeOutcome>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new(CACHE_MAX_SIZE)
    }
}

impl GeocodeCache {
    /// Creates a cache bounded to `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(BoundedCache::new(max_size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Looks up an address (normalized internally).
    ///
    /// Hits are returned tagged with `cached = true`.
    pub fn get(&self, address: &str) -> Option<GeocodeOutcome> {
        let key = normalize_address(address);
        match self.inner.lock().get(&key) {
            Some(outcome) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(outcome.into_cached())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores an outcome for an address (normalized internally).
    pub fn put(&self, address: &str, outcome: GeocodeOutcome) {
        let key = normalize_address(address);
        let evicted = self.inner.lock().insert(key, outcome);
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            debug!(evicted, "Geocode cache full, evicted oldest entries");
        }
    }

    /// Removes every entry. Statistics counters are kept.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (size, max_size) = {
            let inner = self.inner.lock();
            (inner.len(), inner.capacity())
        };
        CacheStats {
            size,
            max_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
