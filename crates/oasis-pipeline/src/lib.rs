// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message pipeline for the Oasis inbox service.
//!
//! For every (sender, account, text) event parsed from a webhook:
//!
//! 1. resolve the business connected to the receiving account,
//! 2. find or create the conversation with the sender,
//! 3. log the inbound message (a redelivered platform message id stops here),
//! 4. pick a canned reply,
//! 5. dispatch it through the platform adapter,
//! 6. log the outbound message with its delivery status.
//!
//! Events are isolated from each other, and storage or send failures are
//! logged rather than propagated, so a webhook sender never sees an error.

pub mod dispatcher;
pub mod pipeline;
pub mod report;
pub mod resolver;

pub use dispatcher::Dispatcher;
pub use pipeline::Pipeline;
pub use report::{EventOutcome, PayloadReport};
pub use resolver::BusinessResolver;
