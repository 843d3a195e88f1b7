//! The monitor loop: iterates the `WorkerRegistry` at a fixed cadence and
//! invokes `Instance::maintain` for each member.

use crate::registry::WorkerRegistry;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs until `shutdown` is cancelled. Snapshots the registry on every
/// tick rather than holding a lock across the pass, so a termination task
/// removing an instance mid-pass never blocks or panics the loop.
pub async fn run(registry: WorkerRegistry, tick_interval: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("monitor loop shutting down");
                return;
            }
            _ = ticker.tick() => {
                for instance in registry.snapshot() {
                    instance.maintain(&registry).await;
                }
            }
        }
    }
}
