//! Periodic eviction of expired run registry entries.
//!
//! Runs whose stream was abandoned and whose terminal state never reached
//! the reconciler would otherwise stay in the registry forever.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::run_registry::RunRegistry;

/// How often the eviction pass runs.
pub const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Evict expired entries every `interval` until `cancel` is triggered.
pub async fn run(registry: Arc<RunRegistry>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        ttl_secs = registry.ttl().as_secs(),
        "Run eviction job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Run eviction job stopping");
                break;
            }
            _ = ticker.tick() => {
                let evicted = registry.evict_expired().await;
                if evicted > 0 {
                    tracing::info!(evicted, "Run eviction: dropped expired runs");
                } else {
                    tracing::debug!("Run eviction: nothing to drop");
                }
            }
        }
    }
}
