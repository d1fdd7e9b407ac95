// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger and Instagram platform adapters for the Oasis inbox service.
//!
//! Both platforms deliver the same webhook envelope and reply through the
//! same Graph API send endpoint, so one [`MetaAdapter`] serves either,
//! configured for a [`Platform`](oasis_core::Platform) at construction.

pub mod adapter;
pub mod client;
pub mod payload;
pub mod signature;

pub use adapter::MetaAdapter;
pub use client::GraphClient;
pub use payload::{object_platform, parse_events};
pub use signature::{sign, verify_signature, SIGNATURE_HEADER};
