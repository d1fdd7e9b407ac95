// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Graph API Send API, shared by Messenger and Instagram.

use std::time::Duration;

use oasis_config::model::DispatchConfig;
use oasis_core::types::MessageId;
use oasis_core::OasisError;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    recipient: Recipient<'a>,
    message: TextMessage<'a>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Graph API client with a per-request timeout.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    timeout: Duration,
}

impl GraphClient {
    /// Build a client from the dispatch settings.
    pub fn new(config: &DispatchConfig) -> Result<Self, OasisError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OasisError::Platform {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: config.graph_api_base.trim_end_matches('/').to_string(),
            api_version: config.graph_api_version.clone(),
            timeout,
        })
    }

    /// Full URL of the Send API endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/{}/me/messages", self.base_url, self.api_version)
    }

    /// Send a text message to `recipient_id` on behalf of the page or account
    /// that owns `access_token`.
    pub async fn send_text(
        &self,
        access_token: &str,
        recipient_id: &str,
        text: &str,
    ) -> Result<MessageId, OasisError> {
        let request = SendRequest {
            recipient: Recipient { id: recipient_id },
            message: TextMessage { text },
        };
        let response = self
            .client
            .post(self.messages_url())
            .query(&[("access_token", access_token)])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(status = %status, recipient = recipient_id, "graph send response");

        if !status.is_success() {
            let detail = match serde_json::from_str::<GraphErrorResponse>(&body) {
                Ok(err) => match err.error.code {
                    Some(code) => format!("{} (code {code})", err.error.message),
                    None => err.error.message,
                },
                Err(_) => body,
            };
            return Err(OasisError::platform(format!(
                "graph API returned {status}: {detail}"
            )));
        }

        let parsed: SendResponse = serde_json::from_str(&body).unwrap_or(SendResponse {
            message_id: None,
        });
        Ok(MessageId(parsed.message_id.unwrap_or_default()))
    }

    fn transport_error(&self, e: reqwest::Error) -> OasisError {
        if e.is_timeout() {
            return OasisError::Timeout {
                duration: self.timeout,
            };
        }
        // reqwest errors carry the URL, which includes the access token.
        let e = e.without_url();
        OasisError::Platform {
            message: format!("graph API request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, timeout_secs: u64) -> DispatchConfig {
        DispatchConfig {
            timeout_secs,
            graph_api_base: server.uri(),
            graph_api_version: "v18.0".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn send_text_posts_recipient_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v18.0/me/messages"))
            .and(query_param("access_token", "EAAB"))
            .and(body_json(serde_json::json!({
                "recipient": { "id": "987654321" },
                "message": { "text": "hello" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "recipient_id": "987654321",
                "message_id": "m_abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::new(&config_for(&server, 5)).unwrap();
        let id = client.send_text("EAAB", "987654321", "hello").await.unwrap();
        assert_eq!(id, MessageId("m_abc".to_string()));
    }

    #[tokio::test]
    async fn api_error_is_reported_with_graph_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Invalid OAuth access token.", "code": 190 }
            })))
            .mount(&server)
            .await;

        let client = GraphClient::new(&config_for(&server, 5)).unwrap();
        let err = client.send_text("bad", "1", "hi").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("400"), "{msg}");
        assert!(msg.contains("Invalid OAuth access token."), "{msg}");
        assert!(!msg.contains("access_token=bad"), "{msg}");
    }

    #[tokio::test]
    async fn slow_api_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = GraphClient::new(&config_for(&server, 1)).unwrap();
        let err = client.send_text("EAAB", "1", "hi").await.unwrap_err();
        assert!(matches!(err, OasisError::Timeout { .. }), "{err}");
    }
}
