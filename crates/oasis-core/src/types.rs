// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the storage backend, platform adapters and the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a message, as returned by a platform send API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Platform,
    Storage,
}

/// A messaging platform the inbox receives from and replies through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Facebook Page / Messenger.
    Facebook,
    /// Instagram Direct.
    Instagram,
    /// Twilio SMS.
    Sms,
}

impl Platform {
    /// Key of this platform's entry in [`Business::integrations`].
    pub fn integration_key(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Sms => "twilio",
        }
    }
}

/// Direction of a message relative to the business.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Delivery result recorded on outbound messages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Skipped,
}

/// Per-platform credential stored on a business.
///
/// Twilio records historically carry the account number under `phone`. It is
/// read as a fallback for `id` (`id` wins when both are present) and always
/// written back as `id`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredCredential")]
pub struct IntegrationCredential {
    /// External account identifier (page id, Instagram account id, phone number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Token used to call the platform send API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Whether the owner marked the integration as connected.
    #[serde(default)]
    pub connected: bool,
    /// Twilio account SID, required for the SMS send API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,
}

impl IntegrationCredential {
    /// Returns the access token if one is configured and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// On-disk shape of a credential, including the legacy `phone` key.
#[derive(Deserialize)]
struct StoredCredential {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    account_sid: Option<String>,
}

impl From<StoredCredential> for IntegrationCredential {
    fn from(stored: StoredCredential) -> Self {
        Self {
            id: stored.id.or(stored.phone),
            access_token: stored.access_token,
            connected: stored.connected,
            account_sid: stored.account_sid,
        }
    }
}

impl std::fmt::Debug for IntegrationCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationCredential")
            .field("id", &self.id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("connected", &self.connected)
            .field("account_sid", &self.account_sid)
            .finish()
    }
}

/// A merchant using the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub owner_id: Option<String>,
    pub slug: String,
    pub name: String,
    /// Free-text category; drives reply heuristics. `None` is treated as retail.
    pub category: Option<String>,
    /// Platform key (see [`Platform::integration_key`]) to credential.
    #[serde(default)]
    pub integrations: BTreeMap<String, IntegrationCredential>,
    pub created_at: String,
}

impl Business {
    /// Returns the credential configured for `platform`, if any.
    pub fn credential(&self, platform: Platform) -> Option<&IntegrationCredential> {
        self.integrations.get(platform.integration_key())
    }
}

/// A thread with one external contact on one platform for one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub business_id: String,
    pub platform: Platform,
    /// The contact's id on the platform (PSID, IGSID or phone number).
    pub external_id: String,
    pub display_name: String,
    pub last_message_at: String,
    pub created_at: String,
}

/// Input for the conversation find-or-create upsert.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub business_id: String,
    pub platform: Platform,
    pub external_id: String,
    /// Display name used only when the conversation is created.
    pub display_name: Option<String>,
    /// Activity timestamp written on both create and update.
    pub at: String,
}

impl NewConversation {
    /// Display name stored on creation: the hint, or `User <first 4 chars>`.
    pub fn resolved_display_name(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let prefix: String = self.external_id.chars().take(4).collect();
                format!("User {prefix}")
            }
        }
    }
}

/// One persisted line of text in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub business_id: String,
    pub channel: Platform,
    pub customer_contact: String,
    pub direction: Direction,
    pub content: String,
    pub is_read: bool,
    /// Platform-assigned message id, used to suppress duplicate deliveries.
    pub external_message_id: Option<String>,
    /// Set on outbound rows only.
    pub delivery: Option<DeliveryStatus>,
    pub created_at: String,
}

impl Message {
    /// Builds an unread inbound message for `conversation`.
    pub fn inbound(
        conversation: &Conversation,
        content: &str,
        external_message_id: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            conversation_id: conversation.id.clone(),
            business_id: conversation.business_id.clone(),
            channel: conversation.platform,
            customer_contact: conversation.external_id.clone(),
            direction: Direction::Inbound,
            content: content.to_string(),
            is_read: false,
            external_message_id,
            delivery: None,
            created_at: now_timestamp(),
        }
    }

    /// Builds a read outbound message for `conversation` with its delivery result.
    pub fn outbound(conversation: &Conversation, content: &str, delivery: DeliveryStatus) -> Self {
        Self {
            id: new_id(),
            conversation_id: conversation.id.clone(),
            business_id: conversation.business_id.clone(),
            channel: conversation.platform,
            customer_contact: conversation.external_id.clone(),
            direction: Direction::Outbound,
            content: content.to_string(),
            is_read: true,
            external_message_id: None,
            delivery: Some(delivery),
            created_at: now_timestamp(),
        }
    }
}

/// A normalized inbound text message parsed from a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub platform: Platform,
    /// The business-side account the message was addressed to.
    pub account_id: String,
    /// The external contact who sent the message.
    pub sender_id: String,
    pub text: String,
    /// Platform message id (`mid` on Meta, `MessageSid` on Twilio).
    pub external_message_id: Option<String>,
    /// Optional display-name hint for new conversations.
    pub sender_name: Option<String>,
}

/// The parts of a webhook POST needed to check its signature.
#[derive(Debug, Clone, Copy)]
pub struct WebhookRequest<'a> {
    /// Public URL the platform called, including the query string.
    pub url: &'a str,
    /// Value of the adapter's signature header, if present.
    pub signature: Option<&'a str>,
    /// Raw request body.
    pub body: &'a [u8],
}

/// A reply to deliver through a platform send API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    /// Recipient's external id on the platform.
    pub recipient_id: String,
    /// Sending account (Twilio `From` number); unused by Meta.
    pub from_account: Option<String>,
    pub text: String,
}

/// Result of attempting to deliver a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The platform accepted the message.
    Sent { message_id: Option<MessageId> },
    /// The call was attempted and failed; the reason is for logs only.
    Failed { reason: String },
    /// No usable credential, so no call was made.
    Skipped,
}

impl DispatchOutcome {
    /// Delivery status persisted on the outbound row.
    pub fn status(&self) -> DeliveryStatus {
        match self {
            DispatchOutcome::Sent { .. } => DeliveryStatus::Sent,
            DispatchOutcome::Failed { .. } => DeliveryStatus::Failed,
            DispatchOutcome::Skipped => DeliveryStatus::Skipped,
        }
    }
}

/// Current UTC time in the millisecond ISO 8601 form used for all stored timestamps.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Generates a new random record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn platform_display_and_parse_agree() {
        for platform in [Platform::Facebook, Platform::Instagram, Platform::Sms] {
            let s = platform.to_string();
            assert_eq!(Platform::from_str(&s).unwrap(), platform);
        }
        assert_eq!(Platform::Sms.to_string(), "sms");
    }

    #[test]
    fn sms_integration_lives_under_twilio() {
        assert_eq!(Platform::Sms.integration_key(), "twilio");
        assert_eq!(Platform::Facebook.integration_key(), "facebook");
    }

    #[test]
    fn credential_with_id_and_phone_prefers_id() {
        let cred: IntegrationCredential =
            serde_json::from_str(r#"{"id":"+1666","phone":"+1777","connected":true}"#).unwrap();
        assert_eq!(cred.id.as_deref(), Some("+1666"));

        let cred: IntegrationCredential =
            serde_json::from_str(r#"{"id":null,"phone":"+1777"}"#).unwrap();
        assert_eq!(cred.id.as_deref(), Some("+1777"));
        assert!(!cred.connected);
    }

    #[test]
    fn credential_accepts_phone_alias() {
        let cred: IntegrationCredential =
            serde_json::from_str(r#"{"phone":"+15550100","connected":true}"#).unwrap();
        assert_eq!(cred.id.as_deref(), Some("+15550100"));
        assert!(cred.connected);
        let json = serde_json::to_string(&cred).unwrap();
        assert!(json.contains("\"id\":\"+15550100\""));
    }

    #[test]
    fn credential_debug_redacts_token() {
        let cred = IntegrationCredential {
            id: Some("123".into()),
            access_token: Some("EAAB-secret".into()),
            connected: true,
            account_sid: None,
        };
        let debug = format!("{cred:?}");
        assert!(!debug.contains("EAAB-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cred = IntegrationCredential {
            access_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(cred.token().is_none());
    }

    #[test]
    fn display_name_defaults_to_id_prefix() {
        let new = NewConversation {
            business_id: "b".into(),
            platform: Platform::Facebook,
            external_id: "987654321".into(),
            display_name: None,
            at: now_timestamp(),
        };
        assert_eq!(new.resolved_display_name(), "User 9876");

        let named = NewConversation {
            display_name: Some("Ana".into()),
            ..new
        };
        assert_eq!(named.resolved_display_name(), "Ana");
    }

    #[test]
    fn dispatch_outcome_maps_to_status() {
        assert_eq!(DispatchOutcome::Skipped.status(), DeliveryStatus::Skipped);
        assert_eq!(
            DispatchOutcome::Failed { reason: "x".into() }.status(),
            DeliveryStatus::Failed
        );
        assert_eq!(
            DispatchOutcome::Sent { message_id: None }.status(),
            DeliveryStatus::Sent
        );
    }

    #[test]
    fn timestamps_sort_lexicographically() {
        let a = now_timestamp();
        let b = now_timestamp();
        assert!(a <= b);
        assert!(a.ends_with('Z'));
    }
}
