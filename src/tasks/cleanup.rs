//! Cache Sweep Task
//!
//! Background task that periodically drops expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that purges expired entries from `cache` every `interval`.
///
/// Without it, expired entries linger until a lookup touches them. The task
/// runs until aborted through the returned handle.
///
/// # Example
/// ```ignore
/// let cache = shared_cache::<Vec<Property>>(DEFAULT_TTL);
/// let sweep = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: SharedCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "starting cache sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.purge_expired();

            if removed > 0 {
                info!("cache sweep: removed {} expired entries", removed);
            } else {
                debug!("cache sweep: no expired entries found");
            }
        }
    })
}
