// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event and per-payload processing results.

use oasis_core::types::DeliveryStatus;

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A reply was generated and dispatch was attempted (or skipped).
    ///
    /// `conversation_id` is `None` only when the conversation upsert failed.
    Replied {
        business_id: String,
        conversation_id: Option<String>,
        reply: String,
        delivery: DeliveryStatus,
    },
    /// The platform message id was already logged; nothing else was done.
    Duplicate { conversation_id: String },
    /// No business is connected to the receiving account.
    Unmatched { account_id: String },
    /// The text produced no reply.
    NoReply { business_id: String },
    /// Business lookup failed; the event was dropped.
    Failed { reason: String },
}

/// Result of processing one webhook body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadReport {
    /// Outcomes for the events that parsed, in payload order.
    pub outcomes: Vec<EventOutcome>,
    /// Entries or events that could not be parsed.
    pub malformed: usize,
}

impl PayloadReport {
    /// Number of events that got a reply attempt.
    pub fn replied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EventOutcome::Replied { .. }))
            .count()
    }
}
