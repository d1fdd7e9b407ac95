// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `oasis serve` command implementation.
//!
//! Opens SQLite storage, registers the Messenger, Instagram and Twilio
//! adapters, and serves the gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use oasis_config::OasisConfig;
use oasis_core::{OasisError, PlatformAdapter, StorageAdapter};
use oasis_gateway::{build_pipeline, start_server, GatewayState};
use oasis_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the `oasis serve` command.
pub async fn run_serve(config: OasisConfig) -> Result<(), OasisError> {
    init_tracing(&config.server.log_level);

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter + Send + Sync> = Arc::new(storage);
    info!(path = %config.storage.database_path, "storage initialized");

    warn_on_open_surfaces(&config);

    let pipeline = Arc::new(build_pipeline(Arc::clone(&storage), &config)?);
    let platforms: Vec<String> = pipeline
        .adapters()
        .map(|a| a.platform().to_string())
        .collect();
    info!(?platforms, fallback = config.routing.single_tenant_fallback, "pipeline ready");

    let state = GatewayState::new(pipeline, &config);
    let shutdown = install_signal_handler();

    start_server(
        &config.server.host,
        config.server.port,
        state,
        shutdown.clone().cancelled_owned(),
    )
    .await?;

    info!("gateway stopped, closing storage");
    storage.close().await?;
    Ok(())
}

fn warn_on_open_surfaces(config: &OasisConfig) {
    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set, the inbox API will reject every request");
    }
    if config.webhooks.meta_app_secret.is_none() {
        warn!("webhooks.meta_app_secret is not set, Meta webhook signatures are not checked");
    }
    if config.webhooks.twilio_auth_token.is_none() {
        warn!("webhooks.twilio_auth_token is not set, Twilio webhook signatures are not checked");
    }
    if config.routing.single_tenant_fallback {
        warn!("routing.single_tenant_fallback is on, unmatched events go to the oldest business");
    }
}

/// Cancelled on the first SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => tokio::select! {
                    _ = ctrl_c => info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                },
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, only Ctrl+C stops the server");
                    let _ = ctrl_c.await;
                    info!("received SIGINT, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, shutting down");
        }

        trigger.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// `RUST_LOG` wins over `server.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("oasis={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
