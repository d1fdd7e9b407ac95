// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound Twilio webhook parsing.

use oasis_core::types::{InboundEvent, Platform};
use oasis_core::OasisError;
use serde::Deserialize;
use serde_json::Value;

/// TwiML acknowledgement that tells Twilio not to send anything itself.
pub const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

#[derive(Debug, Deserialize)]
struct IncomingSms {
    #[serde(rename = "From")]
    from: Option<String>,
    #[serde(rename = "To")]
    to: Option<String>,
    #[serde(rename = "Body")]
    body: Option<String>,
    #[serde(rename = "MessageSid")]
    message_sid: Option<String>,
}

/// Parse a form-encoded Twilio webhook into at most one inbound event.
///
/// A message with an empty body yields nothing; a body missing `From` or
/// `To` yields a single error.
pub fn parse_events(form_body: &[u8]) -> Vec<Result<InboundEvent, OasisError>> {
    let sms: IncomingSms = match serde_urlencoded::from_bytes(form_body) {
        Ok(sms) => sms,
        Err(e) => {
            return vec![Err(OasisError::Platform {
                message: format!("malformed twilio webhook body: {e}"),
                source: Some(Box::new(e)),
            })];
        }
    };

    let (Some(from), Some(to)) = (non_blank(sms.from), non_blank(sms.to)) else {
        return vec![Err(OasisError::platform(
            "twilio webhook is missing From or To",
        ))];
    };
    let Some(text) = non_blank(sms.body) else {
        return Vec::new();
    };

    vec![Ok(InboundEvent {
        platform: Platform::Sms,
        account_id: to,
        sender_id: from,
        text,
        external_message_id: non_blank(sms.message_sid),
        sender_name: None,
    })]
}

/// Re-encode a JSON object of Twilio parameters as a form body.
///
/// Used for envelopes posted to the generic inbound endpoint, which carry the
/// parameters as JSON instead of form encoding.
pub fn form_body_from_json(data: &Value) -> Result<String, OasisError> {
    let Value::Object(map) = data else {
        return Err(OasisError::Validation(
            "twilio data must be a JSON object".to_string(),
        ));
    };
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            _ => {
                return Err(OasisError::Validation(format!(
                    "twilio parameter `{key}` must be a scalar"
                )));
            }
        };
        pairs.push((key.as_str(), value));
    }
    serde_urlencoded::to_string(pairs).map_err(|e| OasisError::Validation(e.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
