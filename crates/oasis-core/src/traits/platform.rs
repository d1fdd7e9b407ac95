// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform adapter trait for messaging integrations (Messenger, Instagram, SMS).

use async_trait::async_trait;

use crate::error::OasisError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    InboundEvent, IntegrationCredential, MessageId, OutboundReply, Platform, WebhookRequest,
};

/// The per-platform capability set the inbound pipeline is parameterized by.
///
/// An adapter knows how to turn a raw webhook body into normalized events and
/// how to deliver a reply through the platform's send API. Everything else
/// (business lookup, persistence, reply selection) is platform independent.
#[async_trait]
pub trait PlatformAdapter: PluginAdapter {
    /// The platform this adapter serves.
    fn platform(&self) -> Platform;

    /// Name of the HTTP header carrying the request signature.
    fn signature_header(&self) -> &'static str;

    /// Checks that a webhook POST was signed by the platform.
    ///
    /// Adapters without a configured signing secret accept every request.
    fn verify_signature(&self, _request: &WebhookRequest<'_>) -> bool {
        true
    }

    /// Parses a webhook body into inbound events.
    ///
    /// Each element is handled independently: a malformed entry yields an
    /// `Err` in its slot without discarding the other events. An unparsable
    /// body yields a single `Err`. Events without text are omitted.
    fn parse_events(&self, body: &[u8]) -> Vec<Result<InboundEvent, OasisError>>;

    /// Returns true if `credential` carries what the send API needs.
    fn can_send(&self, credential: &IntegrationCredential) -> bool {
        credential.token().is_some()
    }

    /// Sends a reply through the platform API.
    ///
    /// Callers check [`PlatformAdapter::can_send`] first; implementations
    /// still fail with a platform error when the credential is unusable.
    async fn send(
        &self,
        credential: &IntegrationCredential,
        reply: &OutboundReply,
    ) -> Result<MessageId, OasisError>;
}
