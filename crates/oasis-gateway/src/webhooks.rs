// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform webhook receivers.
//!
//! GET routes answer the Meta verification handshake. POST routes check the
//! request signature, run the body through the pipeline and always answer
//! 200 with the platform's acknowledgement, whatever happened internally.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use oasis_core::types::{Platform, WebhookRequest};
use oasis_core::PlatformAdapter;

use crate::server::GatewayState;

/// Acknowledgement body Meta expects for event deliveries.
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Query parameters of the verification handshake.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Answer a handshake: 200 with the challenge iff the mode is `subscribe` and
/// the token matches a configured secret; 403 otherwise.
pub fn verify(params: &VerifyParams, expected: Option<&str>) -> Response {
    let matches = params.mode.as_deref() == Some("subscribe")
        && expected.is_some_and(|secret| params.verify_token.as_deref() == Some(secret));
    if matches {
        info!("webhook verified");
        (StatusCode::OK, params.challenge.clone().unwrap_or_default()).into_response()
    } else {
        StatusCode::FORBIDDEN.into_response()
    }
}

/// GET /webhooks/facebook
pub async fn verify_facebook(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    verify(&params, state.webhooks.facebook_token())
}

/// GET /webhooks/instagram
pub async fn verify_instagram(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    verify(&params, state.webhooks.instagram_verify_token.as_deref())
}

/// GET /webhooks/meta
pub async fn verify_meta(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    verify(&params, state.webhooks.meta_verify_token.as_deref())
}

/// GET /webhooks/incoming
///
/// Unless both `hub.mode` and `hub.verify_token` are present this doubles as
/// a liveness check.
pub async fn verify_incoming(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    if params.mode.is_none() || params.verify_token.is_none() {
        return (StatusCode::OK, "Webhook Endpoint Active").into_response();
    }
    verify(&params, state.webhooks.meta_verify_token.as_deref())
}

/// POST /webhooks/facebook
pub async fn receive_facebook(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    meta_delivery(&state, Some(Platform::Facebook), &uri, &headers, &body).await
}

/// POST /webhooks/instagram
pub async fn receive_instagram(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    meta_delivery(&state, Some(Platform::Instagram), &uri, &headers, &body).await
}

/// POST /webhooks/meta
///
/// The payload's `object` field picks Messenger or Instagram.
pub async fn receive_meta(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let platform = oasis_meta::object_platform(&body);
    meta_delivery(&state, platform, &uri, &headers, &body).await
}

async fn meta_delivery(
    state: &GatewayState,
    platform: Option<Platform>,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    // Both Meta adapters share the app secret, so either can check the signature.
    let checker = platform.unwrap_or(Platform::Facebook);
    if !signature_ok(state, checker, uri, headers, body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match platform {
        Some(platform) => {
            state.pipeline.process_payload(platform, body).await;
        }
        None => debug!("meta payload with unsupported object, ignored"),
    }
    (StatusCode::OK, EVENT_RECEIVED).into_response()
}

/// POST /webhooks/twilio
pub async fn receive_twilio(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !signature_ok(&state, Platform::Sms, &uri, &headers, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.pipeline.process_payload(Platform::Sms, &body).await;
    twiml_ack()
}

fn twiml_ack() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        oasis_sms::EMPTY_TWIML,
    )
        .into_response()
}

/// Body of POST /webhooks/incoming.
#[derive(Debug, Deserialize)]
struct Envelope {
    source: String,
    #[serde(default)]
    data: Value,
}

/// POST /webhooks/incoming
///
/// Accepts `{source, data}` envelopes from relays. `data` holds the payload
/// the named platform would have posted directly (Meta JSON, or the Twilio
/// form fields as a JSON object). The envelope is checked against the Meta
/// app secret when one is configured.
pub async fn receive_incoming(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !signature_ok(&state, Platform::Facebook, &uri, &headers, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "incoming webhook body is not a valid envelope");
            return bad_request("Invalid envelope".to_string());
        }
    };

    let (platform, payload) = match envelope.source.as_str() {
        "facebook" | "instagram" => {
            let platform = if envelope.source == "facebook" {
                Platform::Facebook
            } else {
                Platform::Instagram
            };
            (platform, envelope.data.to_string().into_bytes())
        }
        "twilio" => match oasis_sms::form_body_from_json(&envelope.data) {
            Ok(form) => (Platform::Sms, form.into_bytes()),
            Err(e) => return bad_request(e.to_string()),
        },
        "whatsapp" => {
            info!("whatsapp relay payload received, no whatsapp adapter configured");
            return Json(json!({ "success": true })).into_response();
        }
        other => {
            warn!(source = other, "incoming webhook from unknown source");
            return bad_request("Unknown source".to_string());
        }
    };

    let report = state.pipeline.process_payload(platform, &payload).await;
    debug!(%platform, replied = report.replied(), "relayed payload processed");
    Json(json!({ "success": true })).into_response()
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
}

/// Check the request signature with the adapter for `platform`.
///
/// Platforms without a registered adapter have nothing to check against.
fn signature_ok(
    state: &GatewayState,
    platform: Platform,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> bool {
    let Some(adapter) = state.pipeline.adapter(platform) else {
        return true;
    };
    let url = public_url(state.webhooks.public_url.as_deref(), uri);
    let signature = headers
        .get(adapter.signature_header())
        .and_then(|v| v.to_str().ok());
    let request = WebhookRequest {
        url: &url,
        signature,
        body,
    };
    let ok = adapter.verify_signature(&request);
    if !ok {
        warn!(%platform, "webhook signature check failed, request rejected");
    }
    ok
}

/// The URL the platform called: the configured public base plus the request
/// path and query.
fn public_url(base: Option<&str>, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    match base {
        Some(base) => format!("{}{path}", base.trim_end_matches('/')),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: &str, token: &str) -> VerifyParams {
        VerifyParams {
            mode: Some(mode.into()),
            verify_token: Some(token.into()),
            challenge: Some("1234567890".into()),
        }
    }

    #[test]
    fn handshake_requires_subscribe_and_matching_token() {
        assert_eq!(verify(&params("subscribe", "s3cret"), Some("s3cret")).status(), StatusCode::OK);
        assert_eq!(
            verify(&params("subscribe", "wrong"), Some("s3cret")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            verify(&params("unsubscribe", "s3cret"), Some("s3cret")).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn handshake_without_configured_secret_is_forbidden() {
        assert_eq!(verify(&params("subscribe", ""), None).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn public_url_joins_base_and_path() {
        let uri: Uri = "/webhooks/twilio?x=1".parse().unwrap();
        assert_eq!(
            public_url(Some("https://shop.example.com/"), &uri),
            "https://shop.example.com/webhooks/twilio?x=1"
        );
        assert_eq!(public_url(None, &uri), "/webhooks/twilio?x=1");
    }
}
