//! fleetward-daemon — bootstraps the worker-instance lifecycle manager.

use anyhow::{Context, Result};
use clap::Parser;
use fleetward_cloud::{CloudAdapter, ErasedCloudAdapter, HttpCloudAdapter};
use fleetward_core::config::RawConfig;
use fleetward_daemon::Manager;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fleetward-daemon")]
#[command(about = "Worker-instance lifecycle manager for the fleetward cluster master")]
#[command(version)]
struct Args {
    /// Path to a TOML snapshot of the persisted cluster configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Which cloud adapter to construct: a base URL for the HTTP adapter,
    /// or "mock" for local testing without a real provider.
    #[arg(long, value_name = "ID", default_value = "mock")]
    cloud: String,

    /// Raise the log level to DEBUG.
    #[arg(short, long)]
    verbose: bool,
}

fn build_cloud_adapter(id: &str) -> Arc<dyn ErasedCloudAdapter> {
    if id == "mock" {
        Arc::new(fleetward_cloud::mock::MockCloudAdapter::new())
    } else {
        Arc::new(HttpCloudAdapter::new(id))
    }
}

async fn load_persisted_config(path: Option<&PathBuf>) -> Result<RawConfig> {
    let Some(path) = path else {
        return Ok(RawConfig::empty());
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file at {}", path.display()))?;

    RawConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    fleetward_core::logging::init(args.verbose);
    info!("fleetward-daemon starting");

    let cloud = build_cloud_adapter(&args.cloud);

    let user_data = cloud.user_data().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to fetch user-data from cloud provider, using empty mapping");
        RawConfig::empty()
    });
    let persisted = load_persisted_config(args.config.as_ref()).await?;

    let config = fleetward_core::config::resolve(user_data, persisted)
        .context("fatal configuration error")?;
    info!(role = %config.role, "resolved configuration");

    let manager = Manager::new(&config);

    let shutdown = CancellationToken::new();
    let shutdown_for_signals = shutdown.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => info!("received SIGINT"),
                _ = sigterm.recv() => info!("received SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl-c");
            info!("received ctrl-c");
        }

        shutdown_for_signals.cancel();
    });

    manager.run(shutdown).await;

    info!("fleetward-daemon shutdown complete");
    Ok(())
}
