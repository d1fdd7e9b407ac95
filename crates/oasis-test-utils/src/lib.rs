// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Oasis integration tests.
//!
//! Provides in-memory and mock adapters plus a harness that wires them into
//! a [`Pipeline`](oasis_pipeline::Pipeline), for fast, deterministic tests
//! without external services.
//!
//! # Components
//!
//! - [`MemoryStorage`] - fresh-per-test storage backend with failure injection
//! - [`MockPlatform`] - platform adapter that captures sends
//! - [`TestHarness`] - pipeline with seeded businesses and mock platforms

pub mod harness;
pub mod memory_storage;
pub mod mock_platform;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_storage::MemoryStorage;
pub use mock_platform::{MockPlatform, SentReply};
