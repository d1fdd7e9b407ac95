// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock platform adapter for deterministic testing.
//!
//! `MockPlatform` parses a simple JSON event list and captures every send
//! for assertion. Sends can be made to fail or to hang.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use oasis_core::types::{
    AdapterType, HealthStatus, InboundEvent, IntegrationCredential, MessageId, OutboundReply,
    Platform,
};
use oasis_core::{OasisError, PlatformAdapter, PluginAdapter};

/// One captured call to [`PlatformAdapter::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub credential: IntegrationCredential,
    pub reply: OutboundReply,
}

/// Wire form accepted by [`MockPlatform::parse_events`]: a JSON array of these.
#[derive(Debug, Deserialize)]
struct MockEvent {
    account_id: String,
    sender_id: String,
    text: String,
    #[serde(default)]
    mid: Option<String>,
}

/// A mock messaging platform for testing.
pub struct MockPlatform {
    platform: Platform,
    sent: Arc<Mutex<Vec<SentReply>>>,
    fail_with: Arc<Mutex<Option<String>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockPlatform {
    /// Create a mock that answers for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_with: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Make every following send fail with `reason` (or succeed again with `None`).
    pub async fn fail_sends(&self, reason: Option<&str>) {
        *self.fail_with.lock().await = reason.map(String::from);
    }

    /// Make every following send sleep before answering.
    pub async fn delay_sends(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    /// Get all replies passed to `send()`, including failed ones.
    pub async fn sent_replies(&self) -> Vec<SentReply> {
        self.sent.lock().await.clone()
    }

    /// Get the count of send attempts.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Encode events in the form `parse_events` accepts.
    pub fn payload(events: &[(&str, &str, &str, Option<&str>)]) -> Vec<u8> {
        let list: Vec<serde_json::Value> = events
            .iter()
            .map(|(account_id, sender_id, text, mid)| {
                serde_json::json!({
                    "account_id": account_id,
                    "sender_id": sender_id,
                    "text": text,
                    "mid": mid,
                })
            })
            .collect();
        serde_json::to_vec(&list).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, OasisError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OasisError> {
        Ok(())
    }
}

#[async_trait]
impl PlatformAdapter for MockPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn signature_header(&self) -> &'static str {
        "x-mock-signature"
    }

    fn parse_events(&self, body: &[u8]) -> Vec<Result<InboundEvent, OasisError>> {
        let items: Vec<serde_json::Value> = match serde_json::from_slice(body) {
            Ok(items) => items,
            Err(e) => return vec![Err(OasisError::platform(format!("bad mock payload: {e}")))],
        };
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<MockEvent>(item) {
                Ok(e) if e.text.trim().is_empty() => None,
                Ok(e) => Some(Ok(InboundEvent {
                    platform: self.platform,
                    account_id: e.account_id,
                    sender_id: e.sender_id,
                    text: e.text,
                    external_message_id: e.mid,
                    sender_name: None,
                })),
                Err(e) => Some(Err(OasisError::platform(format!("bad mock event: {e}")))),
            })
            .collect()
    }

    async fn send(
        &self,
        credential: &IntegrationCredential,
        reply: &OutboundReply,
    ) -> Result<MessageId, OasisError> {
        self.sent.lock().await.push(SentReply {
            credential: credential.clone(),
            reply: reply.clone(),
        });
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = self.fail_with.lock().await.clone() {
            return Err(OasisError::platform(reason));
        }
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }
}
