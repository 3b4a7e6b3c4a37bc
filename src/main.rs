//! minircd - a minimal IRC chat daemon.
//!
//! Clients connect over TCP, register with NICK/USER, join `#`-prefixed
//! rooms, and exchange messages. A shared-secret BOT_AUTH command marks one
//! session as the resident bot: exempt from idle reaping and re-added when
//! kicked.

mod config;
mod error;
mod handlers;
mod network;
mod state;
mod tasks;

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::handlers::Dispatcher;
use crate::network::Gateway;
use crate::state::Registry;

/// Resolve the configuration path from CLI arguments.
/// Supports `-c <path>`, `--config <path>`, or a bare path.
fn resolve_config_path() -> Option<String> {
    let mut args = std::env::args().skip(1);

    match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => Some(args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {}", flag);
            std::process::exit(1);
        })),
        Some(path) => Some(path),
        None => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (before tracing, so we can use log_format).
    let config = match resolve_config_path() {
        Some(path) => Config::load(&path).map_err(|e| {
            eprintln!("ERROR: failed to load config from {}: {}", path, e);
            e
        })?,
        None if Path::new("config.toml").exists() => Config::load("config.toml")?,
        None => Config::default(),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match config.server.log_format {
        config::LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .json()
                .init();
        }
        config::LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .init();
        }
    }

    if let Err(errors) = config::validate(&config) {
        for err in &errors {
            error!(error = %err, "configuration validation failed");
        }
        anyhow::bail!("configuration validation failed with {} error(s)", errors.len());
    }

    info!(
        host = %config.server.host,
        port = config.server.port,
        bot_auth = config.bot.secret.is_some(),
        "starting minircd"
    );

    let registry = Arc::new(Registry::new(
        config.server.host.clone(),
        config.bot.secret.clone(),
    ));

    // Signal handler for graceful shutdown.
    {
        let shutdown_tx = registry.shutdown_tx.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(s) => s,
                Err(e) => {
                    error!(error = %e, "failed to install SIGINT handler");
                    return;
                }
            };
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    error!(error = %e, "failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = sigint.recv() => info!("received SIGINT - shutting down"),
                _ = sigterm.recv() => info!("received SIGTERM - shutting down"),
            }

            let _ = shutdown_tx.send(());
        });
    }

    let reaper = tasks::reaper::spawn(
        Arc::clone(&registry),
        config.idle_limit(),
        config.check_interval(),
    );

    let dispatcher = Arc::new(Dispatcher::new());
    let addr = config.listen_addr()?;
    let gateway = Gateway::bind(addr, Arc::clone(&registry), dispatcher)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;

    gateway.run().await?;

    // Shutdown: tear down live sessions, then wait for the reaper.
    info!("gateway stopped, closing sessions");
    for (id, _) in registry.live_sessions() {
        registry.remove_session(id).await;
    }
    let _ = reaper.await;

    info!("shutdown complete");
    Ok(())
}
