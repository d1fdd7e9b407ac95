// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound reply delivery.

use std::time::Duration;

use oasis_core::types::{DispatchOutcome, IntegrationCredential, OutboundReply};
use oasis_core::PlatformAdapter;
use tracing::{debug, info, warn};

/// Sends replies through platform adapters, never failing the caller.
///
/// Every send is bounded by `timeout` on top of whatever the adapter's own
/// HTTP client enforces.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Deliver `reply`, or skip when the credential cannot send.
    pub async fn dispatch(
        &self,
        adapter: &dyn PlatformAdapter,
        credential: Option<&IntegrationCredential>,
        reply: &OutboundReply,
    ) -> DispatchOutcome {
        let platform = adapter.platform();
        let Some(credential) = credential.filter(|c| adapter.can_send(c)) else {
            debug!(%platform, recipient = %reply.recipient_id, "no usable credential, reply not sent");
            return DispatchOutcome::Skipped;
        };

        match tokio::time::timeout(self.timeout, adapter.send(credential, reply)).await {
            Ok(Ok(message_id)) => {
                info!(%platform, recipient = %reply.recipient_id, message_id = %message_id.0, "reply sent");
                DispatchOutcome::Sent {
                    message_id: Some(message_id).filter(|id| !id.0.is_empty()),
                }
            }
            Ok(Err(e)) => {
                warn!(%platform, recipient = %reply.recipient_id, error = %e, "reply send failed");
                DispatchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                warn!(%platform, recipient = %reply.recipient_id, timeout = ?self.timeout, "reply send timed out");
                DispatchOutcome::Failed {
                    reason: format!("timed out after {:?}", self.timeout),
                }
            }
        }
    }
}
