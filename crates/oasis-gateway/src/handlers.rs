// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbox API handlers and the public health endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use oasis_core::types::{Conversation, Message};
use oasis_core::{HealthStatus, OasisError, PluginAdapter, StorageAdapter};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An [`OasisError`] rendered as a JSON response.
pub struct ApiError(OasisError);

impl From<OasisError> for ApiError {
    fn from(err: OasisError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OasisError::NotFound { .. } => StatusCode::NOT_FOUND,
            OasisError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => {
                tracing::error!(error = %self.0, "inbox API request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub business_id: String,
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Request body for POST /v1/conversations/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

/// GET /health
///
/// Unauthenticated. 503 when the storage backend is not healthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (status_code, status) = match state.pipeline.storage().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
        .into_response()
}

/// GET /v1/businesses/{id}/conversations
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Path(business_id): Path<String>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let storage = state.pipeline.storage();
    if storage.get_business(&business_id).await?.is_none() {
        return Err(not_found("business", business_id));
    }
    let conversations = storage.list_conversations(&business_id).await?;
    Ok(Json(ConversationListResponse { conversations }))
}

/// GET /v1/businesses/{id}/unread
pub async fn get_unread(
    State(state): State<GatewayState>,
    Path(business_id): Path<String>,
) -> Result<Json<UnreadResponse>, ApiError> {
    let storage = state.pipeline.storage();
    if storage.get_business(&business_id).await?.is_none() {
        return Err(not_found("business", business_id));
    }
    let unread = storage.unread_count(&business_id).await?;
    Ok(Json(UnreadResponse {
        business_id,
        unread,
    }))
}

/// GET /v1/conversations/{id}/messages?limit=
///
/// Chronological; with `limit`, the most recent `limit` messages.
pub async fn list_messages(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    if query.limit.is_some_and(|l| l < 1) {
        return Err(OasisError::Validation("limit must be at least 1".into()).into());
    }
    let storage = state.pipeline.storage();
    if storage.get_conversation(&conversation_id).await?.is_none() {
        return Err(not_found("conversation", conversation_id));
    }
    let messages = storage.get_messages(&conversation_id, query.limit).await?;
    Ok(Json(MessageListResponse { messages }))
}

/// POST /v1/conversations/{id}/read
pub async fn mark_read(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let storage = state.pipeline.storage();
    if storage.get_conversation(&conversation_id).await?.is_none() {
        return Err(not_found("conversation", conversation_id));
    }
    let updated = storage.mark_conversation_read(&conversation_id).await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// POST /v1/conversations/{id}/messages
///
/// Sends an owner-written reply. Delivery problems show up in the returned
/// message's `delivery` field, not as an error status.
pub async fn post_reply(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Json(body): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .pipeline
        .send_manual_reply(&conversation_id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

fn not_found(entity: &'static str, id: String) -> ApiError {
    ApiError(OasisError::NotFound { entity, id })
}
