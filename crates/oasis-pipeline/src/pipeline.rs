// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-event pipeline and the owner's manual reply path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use oasis_config::OasisConfig;
use oasis_core::types::{
    now_timestamp, DeliveryStatus, DispatchOutcome, InboundEvent, Message, NewConversation,
    OutboundReply, Platform,
};
use oasis_core::{OasisError, PlatformAdapter, StorageAdapter};
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::report::{EventOutcome, PayloadReport};
use crate::resolver::BusinessResolver;

/// Routes parsed webhook events to businesses, logs them and replies.
pub struct Pipeline {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    resolver: BusinessResolver,
    dispatcher: Dispatcher,
    adapters: HashMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl Pipeline {
    /// Create a pipeline with no platform adapters registered.
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        single_tenant_fallback: bool,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            resolver: BusinessResolver::new(Arc::clone(&storage), single_tenant_fallback),
            storage,
            dispatcher: Dispatcher::new(dispatch_timeout),
            adapters: HashMap::new(),
        }
    }

    /// Create a pipeline using the routing and dispatch settings of `config`.
    pub fn from_config(storage: Arc<dyn StorageAdapter + Send + Sync>, config: &OasisConfig) -> Self {
        Self::new(
            storage,
            config.routing.single_tenant_fallback,
            Duration::from_secs(config.dispatch.timeout_secs),
        )
    }

    /// Register the adapter for its platform, replacing any earlier one.
    pub fn with_adapter(mut self, adapter: Arc<dyn PlatformAdapter>) -> Self {
        self.adapters.insert(adapter.platform(), adapter);
        self
    }

    /// The adapter registered for `platform`.
    pub fn adapter(&self, platform: Platform) -> Option<&Arc<dyn PlatformAdapter>> {
        self.adapters.get(&platform)
    }

    /// All registered adapters.
    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn PlatformAdapter>> {
        self.adapters.values()
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter + Send + Sync> {
        &self.storage
    }

    /// Parse a webhook body with the `platform` adapter and process every event.
    ///
    /// Malformed entries are counted and logged; the rest are processed in
    /// order, each independently of the others.
    pub async fn process_payload(&self, platform: Platform, body: &[u8]) -> PayloadReport {
        let mut report = PayloadReport::default();
        let Some(adapter) = self.adapters.get(&platform) else {
            warn!(%platform, "no adapter registered, payload ignored");
            return report;
        };

        for parsed in adapter.parse_events(body) {
            match parsed {
                Ok(event) => {
                    let outcome = self.process_event(adapter.as_ref(), &event).await;
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(%platform, error = %e, "skipping malformed webhook entry");
                    report.malformed += 1;
                }
            }
        }
        debug!(
            %platform,
            events = report.outcomes.len(),
            replied = report.replied(),
            malformed = report.malformed,
            "payload processed"
        );
        report
    }

    /// Run one inbound event through resolve, log, reply, dispatch and log.
    pub async fn process_event(
        &self,
        adapter: &dyn PlatformAdapter,
        event: &InboundEvent,
    ) -> EventOutcome {
        let business = match self.resolver.resolve(event.platform, &event.account_id).await {
            Ok(Some(business)) => business,
            Ok(None) => {
                return EventOutcome::Unmatched {
                    account_id: event.account_id.clone(),
                };
            }
            Err(e) => {
                error!(platform = %event.platform, account_id = %event.account_id, error = %e, "business lookup failed");
                return EventOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let new = NewConversation {
            business_id: business.id.clone(),
            platform: event.platform,
            external_id: event.sender_id.clone(),
            display_name: event.sender_name.clone(),
            at: now_timestamp(),
        };
        let conversation = match self.storage.upsert_conversation(&new).await {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                error!(business_id = %business.id, sender = %event.sender_id, error = %e, "conversation upsert failed");
                None
            }
        };

        if let Some(conversation) = &conversation {
            let inbound =
                Message::inbound(conversation, &event.text, event.external_message_id.clone());
            match self.storage.insert_message(&inbound).await {
                Ok(true) => {}
                Ok(false) => {
                    info!(
                        conversation_id = %conversation.id,
                        external_message_id = ?event.external_message_id,
                        "duplicate delivery, already handled"
                    );
                    return EventOutcome::Duplicate {
                        conversation_id: conversation.id.clone(),
                    };
                }
                Err(e) => {
                    error!(conversation_id = %conversation.id, error = %e, "failed to log inbound message");
                }
            }
        }

        let Some(reply) =
            oasis_reply::generate_reply(&business.name, business.category.as_deref(), &event.text)
        else {
            return EventOutcome::NoReply {
                business_id: business.id,
            };
        };

        let outbound = OutboundReply {
            recipient_id: event.sender_id.clone(),
            from_account: Some(event.account_id.clone()),
            text: reply.clone(),
        };
        let outcome = self
            .dispatcher
            .dispatch(adapter, business.credential(event.platform), &outbound)
            .await;
        let delivery = outcome.status();

        if let Some(conversation) = &conversation {
            let message = Message::outbound(conversation, &reply, delivery);
            if let Err(e) = self.storage.insert_message(&message).await {
                error!(conversation_id = %conversation.id, error = %e, "failed to log outbound message");
            }
        }

        EventOutcome::Replied {
            business_id: business.id,
            conversation_id: conversation.map(|c| c.id),
            reply,
            delivery,
        }
    }

    /// Send an owner-written reply into an existing conversation and log it.
    ///
    /// Delivery failures are recorded on the returned message, not raised.
    pub async fn send_manual_reply(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<Message, OasisError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(OasisError::Validation("reply content must not be empty".into()));
        }

        let conversation = self
            .storage
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| OasisError::NotFound {
                entity: "conversation",
                id: conversation_id.to_string(),
            })?;
        let business = self
            .storage
            .get_business(&conversation.business_id)
            .await?
            .ok_or_else(|| OasisError::NotFound {
                entity: "business",
                id: conversation.business_id.clone(),
            })?;

        let credential = business.credential(conversation.platform);
        let delivery = match self.adapters.get(&conversation.platform) {
            Some(adapter) => {
                let reply = OutboundReply {
                    recipient_id: conversation.external_id.clone(),
                    from_account: credential.and_then(|c| c.id.clone()),
                    text: content.to_string(),
                };
                self.dispatcher
                    .dispatch(adapter.as_ref(), credential, &reply)
                    .await
            }
            None => {
                warn!(platform = %conversation.platform, "no adapter registered, manual reply not sent");
                DispatchOutcome::Skipped
            }
        };

        let conversation = self
            .storage
            .upsert_conversation(&NewConversation {
                business_id: conversation.business_id.clone(),
                platform: conversation.platform,
                external_id: conversation.external_id.clone(),
                display_name: None,
                at: now_timestamp(),
            })
            .await?;
        let message = Message::outbound(&conversation, content, delivery.status());
        self.storage.insert_message(&message).await?;
        if delivery.status() != DeliveryStatus::Sent {
            debug!(conversation_id, delivery = %delivery.status(), "manual reply logged without delivery");
        }
        Ok(message)
    }
}
