// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger / Instagram webhook payload parsing.
//!
//! The envelope is decoded loosely first and each entry and messaging event
//! is then decoded on its own, so one malformed event does not hide the rest
//! of the batch.

use oasis_core::types::{InboundEvent, Platform};
use oasis_core::OasisError;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    entry: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    /// Page id (Messenger) or Instagram account id the events were sent to.
    id: String,
    #[serde(default)]
    messaging: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct MessagingEvent {
    sender: Party,
    #[serde(default)]
    message: Option<MessageBody>,
}

#[derive(Debug, Deserialize)]
struct Party {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    mid: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    is_echo: bool,
}

/// `object` value Meta uses for each platform.
fn object_name(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Facebook => Some("page"),
        Platform::Instagram => Some("instagram"),
        Platform::Sms => None,
    }
}

/// Platform named by the payload's `object` field, if it is a Meta payload.
pub fn object_platform(body: &[u8]) -> Option<Platform> {
    let envelope: Envelope = serde_json::from_slice(body).ok()?;
    match envelope.object.as_deref()? {
        "page" => Some(Platform::Facebook),
        "instagram" => Some(Platform::Instagram),
        _ => None,
    }
}

/// Parse a webhook body into inbound text events for `platform`.
///
/// Payloads whose `object` names a different platform yield nothing. Echoes
/// of the business's own messages and events without text are skipped.
pub fn parse_events(platform: Platform, body: &[u8]) -> Vec<Result<InboundEvent, OasisError>> {
    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return vec![Err(OasisError::Platform {
                message: format!("malformed {platform} webhook body: {e}"),
                source: Some(Box::new(e)),
            })];
        }
    };

    if let Some(object) = envelope.object.as_deref()
        && Some(object) != object_name(platform)
    {
        debug!(%platform, object, "ignoring payload for another object type");
        return Vec::new();
    }

    let mut events = Vec::new();
    for (index, raw_entry) in envelope.entry.into_iter().enumerate() {
        let entry: Entry = match serde_json::from_value(raw_entry) {
            Ok(entry) => entry,
            Err(e) => {
                events.push(Err(OasisError::platform(format!(
                    "malformed {platform} entry #{index}: {e}"
                ))));
                continue;
            }
        };
        for raw_event in entry.messaging {
            match parse_messaging(platform, &entry.id, raw_event) {
                Ok(Some(event)) => events.push(Ok(event)),
                Ok(None) => {}
                Err(e) => events.push(Err(e)),
            }
        }
    }
    events
}

fn parse_messaging(
    platform: Platform,
    account_id: &str,
    raw: Value,
) -> Result<Option<InboundEvent>, OasisError> {
    let event: MessagingEvent = serde_json::from_value(raw).map_err(|e| {
        OasisError::platform(format!(
            "malformed {platform} messaging event for account {account_id}: {e}"
        ))
    })?;
    let Some(message) = event.message else {
        // Delivery receipts, reads, postbacks.
        return Ok(None);
    };
    if message.is_echo {
        return Ok(None);
    }
    let Some(text) = message.text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    Ok(Some(InboundEvent {
        platform,
        account_id: account_id.to_string(),
        sender_id: event.sender.id,
        text,
        external_message_id: message.mid,
        sender_name: None,
    }))
}
