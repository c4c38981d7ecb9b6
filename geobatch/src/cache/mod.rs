//! Bounded in-process cache for geocoding outcomes.
//!
//! The cache memoizes normalized address → outcome for the lifetime of the
//! process so repeated addresses in a sheet cost a single network call.
//!
//! # Eviction
//!
//! Capacity is a hard bound. When a new key would exceed it, the
//! earliest-inserted 10% of entries are dropped in one go. This is insertion
//! order, not LRU: reading an entry does not refresh its position.
//!
//! ```text
//! order (ring of keys):  [k0 k1 k2 ... k9999]   ◄── push new keys at the back
//!                          └─ evict from the front
//! entries (hash map):    key → outcome
//! ```

mod bounded;
mod geocode;

pub use bounded::BoundedCache;
pub use geocode::{normalize_address, CacheStats, GeocodeCache, CACHE_MAX_SIZE};
