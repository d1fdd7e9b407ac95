// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business records and their per-platform integration credentials.
//!
//! Integrations are stored as one JSON object per business, keyed by
//! [`Platform::integration_key`].

use std::collections::BTreeMap;

use oasis_core::types::{Business, IntegrationCredential, Platform};
use oasis_core::OasisError;
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{map_tr_err, Database};

const COLUMNS: &str = "id, owner_id, slug, name, category, integrations, created_at";

fn row_to_business(row: &rusqlite::Row<'_>) -> rusqlite::Result<Business> {
    let raw: String = row.get(5)?;
    let integrations: BTreeMap<String, IntegrationCredential> = serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Business {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        slug: row.get(2)?,
        name: row.get(3)?,
        category: row.get(4)?,
        integrations,
        created_at: row.get(6)?,
    })
}

/// Insert a new business.
pub async fn create_business(db: &Database, business: &Business) -> Result<(), OasisError> {
    let integrations = serde_json::to_string(&business.integrations).map_err(OasisError::storage)?;
    let business = business.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO businesses (id, owner_id, slug, name, category, integrations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    business.id,
                    business.owner_id,
                    business.slug,
                    business.name,
                    business.category,
                    integrations,
                    business.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a business by id.
pub async fn get_business(db: &Database, id: &str) -> Result<Option<Business>, OasisError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Business>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM businesses WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], row_to_business)?;
            rows.next().transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// List all businesses, oldest first.
pub async fn list_businesses(db: &Database) -> Result<Vec<Business>, OasisError> {
    db.connection()
        .call(|conn| -> Result<Vec<Business>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM businesses ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map([], row_to_business)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Set or replace one platform credential without touching the others.
///
/// The JSON patch happens inside a single UPDATE so concurrent edits to
/// different platforms do not overwrite each other.
pub async fn set_integration(
    db: &Database,
    business_id: &str,
    platform: Platform,
    credential: &IntegrationCredential,
) -> Result<(), OasisError> {
    let value = serde_json::to_string(credential).map_err(OasisError::storage)?;
    let path = format!("$.{}", platform.integration_key());
    let id = business_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE businesses SET integrations = json_set(integrations, ?2, json(?3))
                 WHERE id = ?1",
                params![id, path, value],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(OasisError::NotFound {
            entity: "business",
            id: business_id.to_string(),
        });
    }
    Ok(())
}

/// Find businesses whose `platform` integration carries `account_id`, oldest first.
///
/// Older Twilio records keep the number under `phone` instead of `id`; both match.
pub async fn find_businesses_by_account(
    db: &Database,
    platform: Platform,
    account_id: &str,
) -> Result<Vec<Business>, OasisError> {
    let key = platform.integration_key();
    let id_path = format!("$.{key}.id");
    let phone_path = format!("$.{key}.phone");
    let account_id = account_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Business>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM businesses
                 WHERE COALESCE(json_extract(integrations, ?1), json_extract(integrations, ?2)) = ?3
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![id_path, phone_path, account_id], row_to_business)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
