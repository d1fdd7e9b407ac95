// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, in-memory).

use async_trait::async_trait;

use crate::error::OasisError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Business, Conversation, IntegrationCredential, Message, NewConversation, Platform,
};

/// Adapter for storage and persistence backends.
///
/// All coordination between concurrent requests happens here, as atomic
/// operations of the backend: the conversation upsert and the duplicate
/// message check must not be expressible as a read followed by a write.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), OasisError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), OasisError>;

    // --- Businesses ---

    /// Inserts a new business.
    async fn create_business(&self, business: &Business) -> Result<(), OasisError>;

    /// Gets a business by id.
    async fn get_business(&self, id: &str) -> Result<Option<Business>, OasisError>;

    /// Lists all businesses, oldest first.
    async fn list_businesses(&self) -> Result<Vec<Business>, OasisError>;

    /// Sets or replaces one platform credential on a business.
    async fn set_integration(
        &self,
        business_id: &str,
        platform: Platform,
        credential: &IntegrationCredential,
    ) -> Result<(), OasisError>;

    /// Finds businesses whose `platform` credential has account id `account_id`, oldest first.
    async fn find_businesses_by_account(
        &self,
        platform: Platform,
        account_id: &str,
    ) -> Result<Vec<Business>, OasisError>;

    // --- Conversations ---

    /// Atomically finds or creates the conversation for
    /// (business, platform, external id) and sets its last-activity time.
    async fn upsert_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<Conversation, OasisError>;

    /// Gets a conversation by id.
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, OasisError>;

    /// Lists a business's conversations, most recent activity first.
    async fn list_conversations(
        &self,
        business_id: &str,
    ) -> Result<Vec<Conversation>, OasisError>;

    // --- Messages ---

    /// Appends a message. Returns `false` without writing when a message with
    /// the same business, platform and external message id already exists.
    async fn insert_message(&self, message: &Message) -> Result<bool, OasisError>;

    /// Gets a conversation's messages in chronological order.
    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, OasisError>;

    /// Marks all inbound messages of a conversation read. Returns the number changed.
    async fn mark_conversation_read(&self, conversation_id: &str) -> Result<u64, OasisError>;

    /// Counts unread inbound messages for a business.
    async fn unread_count(&self, business_id: &str) -> Result<i64, OasisError>;
}
