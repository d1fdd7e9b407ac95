// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`PlatformAdapter`] implementation for Messenger and Instagram.

use async_trait::async_trait;
use tracing::debug;

use oasis_core::types::{
    InboundEvent, IntegrationCredential, MessageId, OutboundReply, Platform, WebhookRequest,
};
use oasis_core::{AdapterType, HealthStatus, OasisError, PlatformAdapter, PluginAdapter};

use crate::client::GraphClient;
use crate::{payload, signature};

/// Meta platform adapter. One instance per platform, sharing a [`GraphClient`].
pub struct MetaAdapter {
    platform: Platform,
    client: GraphClient,
    app_secret: Option<String>,
}

impl MetaAdapter {
    /// Adapter for Facebook Page / Messenger webhooks.
    pub fn messenger(client: GraphClient, app_secret: Option<String>) -> Self {
        Self::new(Platform::Facebook, client, app_secret)
    }

    /// Adapter for Instagram Direct webhooks.
    pub fn instagram(client: GraphClient, app_secret: Option<String>) -> Self {
        Self::new(Platform::Instagram, client, app_secret)
    }

    fn new(platform: Platform, client: GraphClient, app_secret: Option<String>) -> Self {
        Self {
            platform,
            client,
            app_secret: app_secret.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[async_trait]
impl PluginAdapter for MetaAdapter {
    fn name(&self) -> &str {
        match self.platform {
            Platform::Instagram => "instagram",
            _ => "messenger",
        }
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, OasisError> {
        // Credentials are per business, so there is nothing global to check.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OasisError> {
        debug!(platform = %self.platform, "meta adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl PlatformAdapter for MetaAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn signature_header(&self) -> &'static str {
        signature::SIGNATURE_HEADER
    }

    fn verify_signature(&self, request: &WebhookRequest<'_>) -> bool {
        match &self.app_secret {
            Some(secret) => signature::verify_signature(secret, request.signature, request.body),
            None => true,
        }
    }

    fn parse_events(&self, body: &[u8]) -> Vec<Result<InboundEvent, OasisError>> {
        payload::parse_events(self.platform, body)
    }

    async fn send(
        &self,
        credential: &IntegrationCredential,
        reply: &OutboundReply,
    ) -> Result<MessageId, OasisError> {
        let token = credential.token().ok_or_else(|| {
            OasisError::platform(format!("no {} access token configured", self.platform))
        })?;
        self.client
            .send_text(token, &reply.recipient_id, &reply.text)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasis_config::model::DispatchConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base: &str, secret: Option<&str>) -> MetaAdapter {
        let config = DispatchConfig {
            graph_api_base: base.to_string(),
            ..Default::default()
        };
        MetaAdapter::instagram(GraphClient::new(&config).unwrap(), secret.map(String::from))
    }

    fn credential(token: Option<&str>) -> IntegrationCredential {
        IntegrationCredential {
            id: Some("ig-1".into()),
            access_token: token.map(String::from),
            connected: true,
            account_sid: None,
        }
    }

    #[test]
    fn identifies_itself() {
        let a = adapter("http://localhost", None);
        assert_eq!(a.name(), "instagram");
        assert_eq!(a.platform(), Platform::Instagram);
        assert_eq!(a.adapter_type(), AdapterType::Platform);
        assert_eq!(a.signature_header(), "x-hub-signature-256");
    }

    #[test]
    fn can_send_requires_token() {
        let a = adapter("http://localhost", None);
        assert!(a.can_send(&credential(Some("tok"))));
        assert!(!a.can_send(&credential(None)));
        assert!(!a.can_send(&credential(Some(""))));
    }

    #[test]
    fn signature_checked_only_with_secret() {
        let body = br#"{"object":"instagram","entry":[]}"#;
        let unsigned = WebhookRequest {
            url: "https://shop.example.com/webhooks/instagram",
            signature: None,
            body,
        };
        assert!(adapter("http://localhost", None).verify_signature(&unsigned));
        assert!(adapter("http://localhost", Some("  ")).verify_signature(&unsigned));

        let strict = adapter("http://localhost", Some("app-secret"));
        assert!(!strict.verify_signature(&unsigned));
        let header = signature::sign("app-secret", body);
        let signed = WebhookRequest {
            signature: Some(&header),
            ..unsigned
        };
        assert!(strict.verify_signature(&signed));
    }

    #[tokio::test]
    async fn send_goes_through_graph_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v18.0/me/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message_id": "m1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let a = adapter(&server.uri(), None);
        let reply = OutboundReply {
            recipient_id: "u1".into(),
            from_account: None,
            text: "hi".into(),
        };
        let id = a.send(&credential(Some("tok")), &reply).await.unwrap();
        assert_eq!(id.0, "m1");
    }

    #[tokio::test]
    async fn send_without_token_fails_without_network() {
        let a = adapter("http://127.0.0.1:9", None);
        let reply = OutboundReply {
            recipient_id: "u1".into(),
            from_account: None,
            text: "hi".into(),
        };
        assert!(a.send(&credential(None), &reply).await.is_err());
    }
}
