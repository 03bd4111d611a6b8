mod config;
mod digest;
mod health;
mod market_data;
mod metrics;
mod publish;
mod scheduler;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::market_data::collector::SnapshotCollector;
use crate::scheduler::{DigestLoop, Schedule};

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing is not up yet, so config errors go to stderr through anyhow.
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&config.log_level);

    info!(
        port = config.port,
        dry_run = config.dry_run,
        equities = config.stock_symbols.len(),
        "market-digest-bot starting"
    );

    if let Some(port) = config.metrics_port {
        crate::metrics::prometheus::init_metrics_server(port)?;
        info!(port, "prometheus exporter listening");
    }

    let collector = SnapshotCollector::from_config(&config)?;
    let publisher = publish::from_config(&config)?;
    let digest_loop = DigestLoop::new(collector, publisher, Schedule::from_config(&config));

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind health port {}", config.port))?;

    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(digest_loop.run(cancel.clone()));
    let health_handle = tokio::spawn(health::serve(listener, cancel.clone()));

    shutdown_signal().await;
    info!("shutdown requested");
    cancel.cancel();

    join("digest loop", loop_handle).await;
    match health_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "health server returned error"),
        Err(err) => warn!(error = %err, "health server task panicked"),
    }

    info!("market-digest-bot stopped");
    Ok(())
}

async fn join(name: &str, handle: JoinHandle<()>) {
    if let Err(err) = handle.await {
        error!(task = name, error = %err, "task panicked");
    }
}

/// Resolves on Ctrl-C, or SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
