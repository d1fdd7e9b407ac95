// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned reply selection for inbound customer messages.
//!
//! Picks a template from the business category and a handful of keywords.
//! Pure and deterministic: no network, no state, no model call.

pub mod generator;

pub use generator::{classify, generate_reply, Bucket, ReplyKind};
