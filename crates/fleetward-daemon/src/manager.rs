//! Master/worker dispatch, chosen once at startup and never re-entered.

use crate::registry::WorkerRegistry;
use fleetward_core::config::Configuration;
use fleetward_core::role::Role;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The manager this process runs as, tagged by [`Role`] at construction and
/// never switched at runtime.
pub enum Manager {
    /// Owns the `WorkerRegistry` and drives the monitor loop.
    Master {
        registry: WorkerRegistry,
        tick_interval: Duration,
    },
    /// The supervised side. Out of scope beyond the tag itself.
    Worker,
}

impl Manager {
    pub fn new(config: &Configuration) -> Self {
        match config.role {
            Role::Master => Manager::Master {
                registry: WorkerRegistry::new(),
                tick_interval: config.monitor_tick_interval,
            },
            Role::Worker => Manager::Worker,
        }
    }

    /// Run this manager's responsibilities until `shutdown` is cancelled.
    /// Returns immediately for a worker manager, since there is nothing for
    /// it to run here.
    pub async fn run(&self, shutdown: CancellationToken) {
        match self {
            Manager::Master {
                registry,
                tick_interval,
            } => {
                crate::monitor::run(registry.clone(), *tick_interval, shutdown).await;
            }
            Manager::Worker => {
                tracing::info!("running as worker; no registry or monitor loop to drive here");
                shutdown.cancelled().await;
            }
        }
    }

    pub fn registry(&self) -> Option<&WorkerRegistry> {
        match self {
            Manager::Master { registry, .. } => Some(registry),
            Manager::Worker => None,
        }
    }
}
