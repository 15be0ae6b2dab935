//! Cache Module
//!
//! Provides an in-memory key/value cache with per-entry TTL and lazy expiration.

mod entry;
mod key;
mod stats;
mod store;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use key::derive_key;
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// TTL used when none is given: five minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache handle shared by every controller that should see the same invalidations.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;

/// Creates a new shared cache with the given default TTL.
pub fn shared_cache<V: Clone>(default_ttl: Duration) -> SharedCache<V> {
    Arc::new(RwLock::new(TtlCache::with_default_ttl(default_ttl)))
}
