// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation find-or-create and inbox listing.

use oasis_core::types::{new_id, Conversation, NewConversation};
use oasis_core::OasisError;
use rusqlite::params;

use super::parse_column;
use crate::database::{map_tr_err, Database};

const COLUMNS: &str =
    "id, business_id, platform, external_id, display_name, last_message_at, created_at";

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        business_id: row.get(1)?,
        platform: parse_column(row, 2)?,
        external_id: row.get(3)?,
        display_name: row.get(4)?,
        last_message_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Find or create the conversation for (business, platform, external id).
///
/// A single `INSERT .. ON CONFLICT DO UPDATE .. RETURNING` statement, so two
/// deliveries racing for the same contact always land on one row. The display
/// name is only written on creation; `last_message_at` never moves backwards.
pub async fn upsert_conversation(
    db: &Database,
    new: &NewConversation,
) -> Result<Conversation, OasisError> {
    let id = new_id();
    let display_name = new.resolved_display_name();
    let new = new.clone();
    db.connection()
        .call(move |conn| -> Result<Conversation, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "INSERT INTO conversations
                         (id, business_id, platform, external_id, display_name, last_message_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                     ON CONFLICT (business_id, platform, external_id) DO UPDATE SET
                         last_message_at = MAX(conversations.last_message_at, excluded.last_message_at)
                     RETURNING {COLUMNS}"
                ),
                params![
                    id,
                    new.business_id,
                    new.platform.to_string(),
                    new.external_id,
                    display_name,
                    new.at,
                ],
                row_to_conversation,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by id.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, OasisError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM conversations WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], row_to_conversation)?;
            rows.next().transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// List a business's conversations, most recent activity first.
pub async fn list_conversations(
    db: &Database,
    business_id: &str,
) -> Result<Vec<Conversation>, OasisError> {
    let business_id = business_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Conversation>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations WHERE business_id = ?1
                 ORDER BY last_message_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![business_id], row_to_conversation)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
