// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Oasis storefront inbox.
//!
//! This crate provides the error type, the domain types (businesses,
//! conversations, messages, inbound events) and the adapter traits that the
//! storage backend and the messaging platforms implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OasisError;
pub use types::{
    AdapterType, Business, Conversation, DeliveryStatus, Direction, DispatchOutcome,
    HealthStatus, InboundEvent, IntegrationCredential, Message, MessageId, NewConversation,
    OutboundReply, Platform, WebhookRequest,
};

pub use traits::{PlatformAdapter, PluginAdapter, StorageAdapter};
