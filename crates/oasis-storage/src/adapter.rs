// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use oasis_config::model::StorageConfig;
use oasis_core::types::{
    Business, Conversation, IntegrationCredential, Message, NewConversation, Platform,
};
use oasis_core::{AdapterType, HealthStatus, OasisError, PluginAdapter, StorageAdapter};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, OasisError> {
        self.db.get().ok_or_else(|| OasisError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), OasisError> {
        if !self.config.wal_mode {
            return Ok(());
        }
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OasisError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OasisError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), OasisError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| OasisError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), OasisError> {
        let db = self.db()?;
        self.checkpoint(db).await
    }

    // --- Businesses ---

    async fn create_business(&self, business: &Business) -> Result<(), OasisError> {
        queries::businesses::create_business(self.db()?, business).await
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, OasisError> {
        queries::businesses::get_business(self.db()?, id).await
    }

    async fn list_businesses(&self) -> Result<Vec<Business>, OasisError> {
        queries::businesses::list_businesses(self.db()?).await
    }

    async fn set_integration(
        &self,
        business_id: &str,
        platform: Platform,
        credential: &IntegrationCredential,
    ) -> Result<(), OasisError> {
        queries::businesses::set_integration(self.db()?, business_id, platform, credential).await
    }

    async fn find_businesses_by_account(
        &self,
        platform: Platform,
        account_id: &str,
    ) -> Result<Vec<Business>, OasisError> {
        queries::businesses::find_businesses_by_account(self.db()?, platform, account_id).await
    }

    // --- Conversations ---

    async fn upsert_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<Conversation, OasisError> {
        queries::conversations::upsert_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, OasisError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        business_id: &str,
    ) -> Result<Vec<Conversation>, OasisError> {
        queries::conversations::list_conversations(self.db()?, business_id).await
    }

    // --- Messages ---

    async fn insert_message(&self, message: &Message) -> Result<bool, OasisError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, OasisError> {
        queries::messages::get_messages_for_conversation(self.db()?, conversation_id, limit).await
    }

    async fn mark_conversation_read(&self, conversation_id: &str) -> Result<u64, OasisError> {
        queries::messages::mark_conversation_read(self.db()?, conversation_id).await
    }

    async fn unread_count(&self, business_id: &str) -> Result<i64, OasisError> {
        queries::messages::unread_count(self.db()?, business_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasis_core::types::{now_timestamp, DeliveryStatus};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn cafe() -> Business {
        Business {
            id: "biz-cafe".to_string(),
            owner_id: Some("owner-1".to_string()),
            slug: "cafe".to_string(),
            name: "Cafe".to_string(),
            category: Some("cafe".to_string()),
            integrations: Default::default(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_inbox_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage.create_business(&cafe()).await.unwrap();
        let page = IntegrationCredential {
            id: Some("123456789".to_string()),
            access_token: Some("EAAB".to_string()),
            connected: true,
            account_sid: None,
        };
        storage
            .set_integration("biz-cafe", Platform::Facebook, &page)
            .await
            .unwrap();

        let found = storage
            .find_businesses_by_account(Platform::Facebook, "123456789")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let conv = storage
            .upsert_conversation(&NewConversation {
                business_id: "biz-cafe".to_string(),
                platform: Platform::Facebook,
                external_id: "987654321".to_string(),
                display_name: None,
                at: now_timestamp(),
            })
            .await
            .unwrap();
        assert!(
            storage
                .insert_message(&Message::inbound(&conv, "Do you have hours?", Some("mid.1".into())))
                .await
                .unwrap()
        );
        assert!(
            storage
                .insert_message(&Message::outbound(&conv, "Hi!", DeliveryStatus::Sent))
                .await
                .unwrap()
        );

        assert_eq!(storage.unread_count("biz-cafe").await.unwrap(), 1);
        let messages = storage.get_messages(&conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(storage.mark_conversation_read(&conv.id).await.unwrap(), 1);
        assert_eq!(storage.list_conversations("biz-cafe").await.unwrap().len(), 1);

        storage.close().await.unwrap();
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn racing_deliveries_share_one_conversation() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("race.db");
        let storage = Arc::new(SqliteStorage::new(make_config(db_path.to_str().unwrap())));
        storage.initialize().await.unwrap();
        storage.create_business(&cafe()).await.unwrap();

        let new = NewConversation {
            business_id: "biz-cafe".to_string(),
            platform: Platform::Instagram,
            external_id: "ig-user".to_string(),
            display_name: None,
            at: now_timestamp(),
        };
        let (a, b) = tokio::join!(
            {
                let storage = Arc::clone(&storage);
                let new = new.clone();
                async move { storage.upsert_conversation(&new).await }
            },
            {
                let storage = Arc::clone(&storage);
                let new = new.clone();
                async move { storage.upsert_conversation(&new).await }
            }
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(storage.list_conversations("biz-cafe").await.unwrap().len(), 1);
    }
}
