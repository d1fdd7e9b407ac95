// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `oasis business` command implementation.
//!
//! Creates businesses and sets their platform credentials, standing in for
//! the dashboard settings page.

use std::collections::BTreeMap;

use oasis_config::OasisConfig;
use oasis_core::types::{new_id, now_timestamp, Business, IntegrationCredential, Platform};
use oasis_core::{OasisError, StorageAdapter};
use oasis_storage::SqliteStorage;

/// Open and migrate the configured database.
pub async fn open_storage(config: &OasisConfig) -> Result<SqliteStorage, OasisError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

/// Create a business. The slug defaults to the name in kebab case.
pub async fn add(
    storage: &dyn StorageAdapter,
    name: &str,
    category: Option<String>,
    slug: Option<String>,
    owner_id: Option<String>,
) -> Result<Business, OasisError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OasisError::Validation("business name must not be empty".into()));
    }
    let slug = slug.unwrap_or_else(|| slugify(name));
    if slug.is_empty() {
        return Err(OasisError::Validation(format!(
            "cannot derive a slug from `{name}`, pass --slug"
        )));
    }

    let business = Business {
        id: new_id(),
        owner_id,
        slug,
        name: name.to_string(),
        category: category.filter(|c| !c.trim().is_empty()),
        integrations: BTreeMap::new(),
        created_at: now_timestamp(),
    };
    storage.create_business(&business).await?;
    Ok(business)
}

/// Print every business, oldest first.
pub async fn list(storage: &dyn StorageAdapter, json: bool) -> Result<(), OasisError> {
    let businesses = storage.list_businesses().await?;
    if json {
        let out = serde_json::to_string_pretty(&businesses)
            .map_err(|e| OasisError::Internal(format!("failed to encode businesses: {e}")))?;
        println!("{out}");
        return Ok(());
    }
    if businesses.is_empty() {
        println!("no businesses yet; create one with `oasis business add <name>`");
        return Ok(());
    }
    for business in &businesses {
        println!("{}", summary_line(business));
    }
    Ok(())
}

/// Set or replace one platform credential on a business.
pub async fn connect(
    storage: &dyn StorageAdapter,
    business_id: &str,
    platform: Platform,
    account_id: String,
    token: Option<String>,
    account_sid: Option<String>,
) -> Result<(), OasisError> {
    if account_id.trim().is_empty() {
        return Err(OasisError::Validation("--account-id must not be empty".into()));
    }
    if account_sid.is_some() && platform != Platform::Sms {
        return Err(OasisError::Validation(
            "--account-sid only applies to the sms platform".into(),
        ));
    }
    let credential = IntegrationCredential {
        id: Some(account_id),
        access_token: token,
        connected: true,
        account_sid,
    };
    storage
        .set_integration(business_id, platform, &credential)
        .await
}

fn summary_line(business: &Business) -> String {
    let integrations: Vec<String> = business
        .integrations
        .iter()
        .map(|(key, cred)| {
            let account = cred.id.as_deref().unwrap_or("?");
            let token = if cred.token().is_some() { "" } else { ", no token" };
            format!("{key}={account}{token}")
        })
        .collect();
    format!(
        "{}  {:<24} {:<12} [{}]",
        business.id,
        business.name,
        business.category.as_deref().unwrap_or("retail"),
        integrations.join(" ")
    )
}

/// Lowercase ASCII alphanumerics joined by single dashes.
fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
