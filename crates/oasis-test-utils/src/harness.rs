// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles a [`Pipeline`] over in-memory (or temp SQLite)
//! storage with a [`MockPlatform`] registered for every platform, and
//! provides helpers to seed businesses and deliver webhook bodies.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use oasis_config::model::StorageConfig;
use oasis_core::types::{new_id, now_timestamp, Business, IntegrationCredential, Platform};
use oasis_core::{OasisError, StorageAdapter};
use oasis_pipeline::{PayloadReport, Pipeline};
use oasis_storage::SqliteStorage;

use crate::memory_storage::MemoryStorage;
use crate::mock_platform::MockPlatform;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    single_tenant_fallback: bool,
    sqlite: bool,
    dispatch_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            single_tenant_fallback: false,
            sqlite: false,
            dispatch_timeout: Duration::from_secs(5),
        }
    }

    /// Route unmatched events to the oldest business.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.single_tenant_fallback = enabled;
        self
    }

    /// Back the pipeline with a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Bound each platform send.
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Build the test harness.
    pub async fn build(self) -> Result<TestHarness, OasisError> {
        let memory = Arc::new(MemoryStorage::new());
        let mut temp_dir = None;
        let storage: Arc<dyn StorageAdapter + Send + Sync> = if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(OasisError::storage)?;
            let sqlite = SqliteStorage::new(StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
            });
            sqlite.initialize().await?;
            temp_dir = Some(dir);
            Arc::new(sqlite)
        } else {
            memory.clone()
        };

        let facebook = Arc::new(MockPlatform::new(Platform::Facebook));
        let instagram = Arc::new(MockPlatform::new(Platform::Instagram));
        let sms = Arc::new(MockPlatform::new(Platform::Sms));

        let pipeline = Pipeline::new(
            Arc::clone(&storage),
            self.single_tenant_fallback,
            self.dispatch_timeout,
        )
        .with_adapter(facebook.clone())
        .with_adapter(instagram.clone())
        .with_adapter(sms.clone());

        Ok(TestHarness {
            pipeline: Arc::new(pipeline),
            storage,
            memory,
            facebook,
            instagram,
            sms,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock platforms and throwaway storage.
pub struct TestHarness {
    pub pipeline: Arc<Pipeline>,
    /// The storage the pipeline writes to.
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    /// In-memory backend; only wired into the pipeline without `with_sqlite`.
    pub memory: Arc<MemoryStorage>,
    pub facebook: Arc<MockPlatform>,
    pub instagram: Arc<MockPlatform>,
    pub sms: Arc<MockPlatform>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The mock registered for `platform`.
    pub fn mock(&self, platform: Platform) -> &Arc<MockPlatform> {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Instagram => &self.instagram,
            Platform::Sms => &self.sms,
        }
    }

    /// Create a business with one connected integration.
    ///
    /// `token` of `None` leaves the integration without a send credential.
    pub async fn add_business(
        &self,
        name: &str,
        category: Option<&str>,
        platform: Platform,
        account_id: &str,
        token: Option<&str>,
    ) -> Result<Business, OasisError> {
        let credential = IntegrationCredential {
            id: Some(account_id.to_string()),
            access_token: token.map(String::from),
            connected: true,
            account_sid: (platform == Platform::Sms).then(|| "AC-test".to_string()),
        };
        let business = Business {
            id: new_id(),
            owner_id: None,
            slug: format!("{}-{}", name.to_lowercase().replace(' ', "-"), &new_id()[..8]),
            name: name.to_string(),
            category: category.map(String::from),
            integrations: BTreeMap::from([(platform.integration_key().to_string(), credential)]),
            created_at: now_timestamp(),
        };
        self.storage.create_business(&business).await?;
        Ok(business)
    }

    /// Deliver a mock webhook body built from `(account_id, sender_id, text, mid)` tuples.
    pub async fn deliver(
        &self,
        platform: Platform,
        events: &[(&str, &str, &str, Option<&str>)],
    ) -> PayloadReport {
        self.pipeline
            .process_payload(platform, &MockPlatform::payload(events))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_memory_storage() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert_eq!(harness.pipeline.adapters().count(), 3);
        assert!(harness.pipeline.adapter(Platform::Sms).is_some());
    }

    #[tokio::test]
    async fn harness_builds_with_sqlite_storage() {
        let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
        let business = harness
            .add_business("Cafe", Some("food"), Platform::Facebook, "page-1", Some("tok"))
            .await
            .unwrap();
        let found = harness
            .storage
            .find_businesses_by_account(Platform::Facebook, "page-1")
            .await
            .unwrap();
        assert_eq!(found[0].id, business.id);
    }
}
