// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio SMS platform adapter for the Oasis inbox service.
//!
//! Inbound messages arrive as form-encoded webhooks signed with
//! `X-Twilio-Signature`; replies go out through the Twilio Messages REST API.

pub mod adapter;
pub mod signature;
pub mod webhook;

pub use adapter::TwilioAdapter;
pub use signature::{compute_signature, verify_signature, SIGNATURE_HEADER};
pub use webhook::{form_body_from_json, parse_events, EMPTY_TWIML};
