// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use oasis_config::model::WebhookConfig;
use oasis_config::OasisConfig;
use oasis_core::{OasisError, StorageAdapter};
use oasis_meta::{GraphClient, MetaAdapter};
use oasis_pipeline::Pipeline;
use oasis_sms::TwilioAdapter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};
use crate::{handlers, webhooks};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The inbound pipeline, with one adapter per platform.
    pub pipeline: Arc<Pipeline>,
    /// Verification secrets and the public URL for signature checks.
    pub webhooks: Arc<WebhookConfig>,
    /// Inbox API authentication.
    pub auth: AuthConfig,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(pipeline: Arc<Pipeline>, config: &OasisConfig) -> Self {
        Self {
            pipeline,
            webhooks: Arc::new(config.webhooks.clone()),
            auth: AuthConfig {
                bearer_token: config.gateway.bearer_token.clone(),
            },
            start_time: Instant::now(),
        }
    }
}

/// Build the pipeline with the Messenger, Instagram and Twilio adapters.
pub fn build_pipeline(
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    config: &OasisConfig,
) -> Result<Pipeline, OasisError> {
    let graph = GraphClient::new(&config.dispatch)?;
    let app_secret = config.webhooks.meta_app_secret.clone();
    let twilio = TwilioAdapter::new(&config.dispatch, &config.webhooks)?;

    Ok(Pipeline::from_config(storage, config)
        .with_adapter(Arc::new(MetaAdapter::messenger(graph.clone(), app_secret.clone())))
        .with_adapter(Arc::new(MetaAdapter::instagram(graph, app_secret)))
        .with_adapter(Arc::new(twilio)))
}

/// Assemble the router:
/// - `/health` (public)
/// - `/webhooks/*` (public, signature-checked when secrets are configured)
/// - `/v1/*` inbox API (bearer auth)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhooks/facebook",
            get(webhooks::verify_facebook).post(webhooks::receive_facebook),
        )
        .route(
            "/webhooks/instagram",
            get(webhooks::verify_instagram).post(webhooks::receive_instagram),
        )
        .route(
            "/webhooks/meta",
            get(webhooks::verify_meta).post(webhooks::receive_meta),
        )
        .route("/webhooks/twilio", post(webhooks::receive_twilio))
        .route(
            "/webhooks/incoming",
            get(webhooks::verify_incoming).post(webhooks::receive_incoming),
        )
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/businesses/{id}/conversations",
            get(handlers::list_conversations),
        )
        .route("/v1/businesses/{id}/unread", get(handlers::get_unread))
        .route(
            "/v1/conversations/{id}/messages",
            get(handlers::list_messages).post(handlers::post_reply),
        )
        .route("/v1/conversations/{id}/read", post(handlers::mark_read))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn start_server(
    host: &str,
    port: u16,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), OasisError> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| OasisError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| OasisError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
