// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Oasis inbox service.
//!
//! Serves the platform webhook receivers (verification handshake and event
//! delivery) and the bearer-protected inbox API the owner dashboard reads.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod webhooks;

pub use auth::AuthConfig;
pub use server::{build_pipeline, build_router, start_server, GatewayState};
