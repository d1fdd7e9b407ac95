// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage backend for tests.
//!
//! Every operation runs under one lock, which gives the same atomicity the
//! SQLite backend gets from its constraints: the conversation upsert and the
//! duplicate message check cannot interleave.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use oasis_core::types::{
    new_id, Business, Conversation, Direction, IntegrationCredential, Message, NewConversation,
    Platform,
};
use oasis_core::{AdapterType, HealthStatus, OasisError, PluginAdapter, StorageAdapter};

#[derive(Default)]
struct State {
    businesses: Vec<Business>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

/// A [`StorageAdapter`] holding everything in memory. Create one per test.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    fail_message_inserts: AtomicBool,
    fail_upserts: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `insert_message` call fail until reset.
    pub fn set_fail_message_inserts(&self, fail: bool) {
        self.fail_message_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make every `upsert_conversation` call fail until reset.
    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// All stored messages, in insertion order.
    pub async fn all_messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    /// All stored conversations, in creation order.
    pub async fn all_conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations.clone()
    }
}

fn injected(what: &str) -> OasisError {
    OasisError::storage(std::io::Error::other(format!("injected {what} failure")))
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OasisError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OasisError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), OasisError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), OasisError> {
        Ok(())
    }

    async fn create_business(&self, business: &Business) -> Result<(), OasisError> {
        let mut state = self.state.lock().await;
        if state
            .businesses
            .iter()
            .any(|b| b.id == business.id || b.slug == business.slug)
        {
            return Err(OasisError::Validation(format!(
                "business {} or slug {} already exists",
                business.id, business.slug
            )));
        }
        state.businesses.push(business.clone());
        Ok(())
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, OasisError> {
        let state = self.state.lock().await;
        Ok(state.businesses.iter().find(|b| b.id == id).cloned())
    }

    async fn list_businesses(&self) -> Result<Vec<Business>, OasisError> {
        let state = self.state.lock().await;
        let mut all = state.businesses.clone();
        // Stable sort keeps insertion order for equal timestamps, like rowid.
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn set_integration(
        &self,
        business_id: &str,
        platform: Platform,
        credential: &IntegrationCredential,
    ) -> Result<(), OasisError> {
        let mut state = self.state.lock().await;
        let business = state
            .businesses
            .iter_mut()
            .find(|b| b.id == business_id)
            .ok_or_else(|| OasisError::NotFound {
                entity: "business",
                id: business_id.to_string(),
            })?;
        business
            .integrations
            .insert(platform.integration_key().to_string(), credential.clone());
        Ok(())
    }

    async fn find_businesses_by_account(
        &self,
        platform: Platform,
        account_id: &str,
    ) -> Result<Vec<Business>, OasisError> {
        let mut found: Vec<Business> = self
            .list_businesses()
            .await?
            .into_iter()
            .filter(|b| {
                b.credential(platform)
                    .and_then(|c| c.id.as_deref())
                    .is_some_and(|id| id == account_id)
            })
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn upsert_conversation(
        &self,
        new: &NewConversation,
    ) -> Result<Conversation, OasisError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(injected("upsert"));
        }
        let mut state = self.state.lock().await;
        if let Some(existing) = state.conversations.iter_mut().find(|c| {
            c.business_id == new.business_id
                && c.platform == new.platform
                && c.external_id == new.external_id
        }) {
            if new.at > existing.last_message_at {
                existing.last_message_at = new.at.clone();
            }
            return Ok(existing.clone());
        }
        let conversation = Conversation {
            id: new_id(),
            business_id: new.business_id.clone(),
            platform: new.platform,
            external_id: new.external_id.clone(),
            display_name: new.resolved_display_name(),
            last_message_at: new.at.clone(),
            created_at: new.at.clone(),
        };
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, OasisError> {
        let state = self.state.lock().await;
        Ok(state.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_conversations(
        &self,
        business_id: &str,
    ) -> Result<Vec<Conversation>, OasisError> {
        let state = self.state.lock().await;
        let mut list: Vec<Conversation> = state
            .conversations
            .iter()
            .filter(|c| c.business_id == business_id)
            .cloned()
            .collect();
        list.reverse();
        list.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(list)
    }

    async fn insert_message(&self, message: &Message) -> Result<bool, OasisError> {
        if self.fail_message_inserts.load(Ordering::SeqCst) {
            return Err(injected("message insert"));
        }
        let mut state = self.state.lock().await;
        if !state
            .conversations
            .iter()
            .any(|c| c.id == message.conversation_id)
        {
            return Err(OasisError::NotFound {
                entity: "conversation",
                id: message.conversation_id.clone(),
            });
        }
        if let Some(ext) = &message.external_message_id
            && state.messages.iter().any(|m| {
                m.business_id == message.business_id
                    && m.channel == message.channel
                    && m.external_message_id.as_ref() == Some(ext)
            })
        {
            return Ok(false);
        }
        state.messages.push(message.clone());
        Ok(true)
    }

    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, OasisError> {
        let state = self.state.lock().await;
        let mut list: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        if let Some(limit) = limit.and_then(|l| usize::try_from(l).ok())
            && list.len() > limit
        {
            list.drain(..list.len() - limit);
        }
        Ok(list)
    }

    async fn mark_conversation_read(&self, conversation_id: &str) -> Result<u64, OasisError> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for m in state.messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.direction == Direction::Inbound && !m.is_read
        }) {
            m.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_count(&self, business_id: &str) -> Result<i64, OasisError> {
        let state = self.state.lock().await;
        let count = state
            .messages
            .iter()
            .filter(|m| m.business_id == business_id && m.direction == Direction::Inbound && !m.is_read)
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasis_core::types::now_timestamp;
    use std::sync::Arc;

    fn business(id: &str, created_at: &str) -> Business {
        Business {
            id: id.to_string(),
            owner_id: None,
            slug: id.to_string(),
            name: id.to_string(),
            category: None,
            integrations: Default::default(),
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn concurrent_upserts_share_a_conversation() {
        let storage = Arc::new(MemoryStorage::new());
        storage.create_business(&business("b", "1")).await.unwrap();
        let new = NewConversation {
            business_id: "b".into(),
            platform: Platform::Sms,
            external_id: "+1555".into(),
            display_name: None,
            at: now_timestamp(),
        };
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let new = new.clone();
                tokio::spawn(async move { storage.upsert_conversation(&new).await.unwrap().id })
            })
            .collect();
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(storage.all_conversations().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_external_id_is_rejected() {
        let storage = MemoryStorage::new();
        storage.create_business(&business("b", "1")).await.unwrap();
        let conv = storage
            .upsert_conversation(&NewConversation {
                business_id: "b".into(),
                platform: Platform::Facebook,
                external_id: "u".into(),
                display_name: None,
                at: now_timestamp(),
            })
            .await
            .unwrap();
        let m = Message::inbound(&conv, "hi", Some("mid".into()));
        assert!(storage.insert_message(&m).await.unwrap());
        assert!(!storage
            .insert_message(&Message::inbound(&conv, "hi", Some("mid".into())))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn injected_failures_surface_as_storage_errors() {
        let storage = MemoryStorage::new();
        storage.set_fail_upserts(true);
        let err = storage
            .upsert_conversation(&NewConversation {
                business_id: "b".into(),
                platform: Platform::Facebook,
                external_id: "u".into(),
                display_name: None,
                at: now_timestamp(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OasisError::Storage { .. }));
    }
}
