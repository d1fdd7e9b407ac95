// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps a receiving platform account to the business that owns it.

use std::sync::Arc;

use oasis_core::types::{Business, Platform};
use oasis_core::{OasisError, StorageAdapter};
use tracing::warn;

/// Resolves (platform, external account id) to a [`Business`].
pub struct BusinessResolver {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    single_tenant_fallback: bool,
}

impl BusinessResolver {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>, single_tenant_fallback: bool) -> Self {
        Self {
            storage,
            single_tenant_fallback,
        }
    }

    /// Find the business connected to `account_id` on `platform`.
    ///
    /// With several matches the oldest business wins. With none, returns
    /// `Ok(None)` unless single-tenant fallback is enabled, in which case the
    /// oldest business overall is used. Each unusual case logs one warning.
    pub async fn resolve(
        &self,
        platform: Platform,
        account_id: &str,
    ) -> Result<Option<Business>, OasisError> {
        let mut matches = self
            .storage
            .find_businesses_by_account(platform, account_id)
            .await?;

        if matches.len() > 1 {
            let ids: Vec<&str> = matches.iter().map(|b| b.id.as_str()).collect();
            warn!(
                %platform,
                account_id,
                businesses = ?ids,
                "account connected to several businesses, using the oldest"
            );
        }
        if !matches.is_empty() {
            return Ok(Some(matches.swap_remove(0)));
        }

        if !self.single_tenant_fallback {
            warn!(%platform, account_id, "no business connected to account, dropping event");
            return Ok(None);
        }

        let fallback = self.storage.list_businesses().await?.into_iter().next();
        match &fallback {
            Some(business) => warn!(
                %platform,
                account_id,
                business_id = %business.id,
                "no business connected to account, using single-tenant fallback"
            ),
            None => warn!(%platform, account_id, "no business connected to account and none exist"),
        }
        Ok(fallback)
    }
}
