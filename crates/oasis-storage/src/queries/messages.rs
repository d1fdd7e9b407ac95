// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append, history, and read-state operations.

use oasis_core::types::{Direction, Message};
use oasis_core::OasisError;
use rusqlite::params;

use super::{parse_column, parse_optional_column};
use crate::database::{map_tr_err, Database};

const COLUMNS: &str = "id, conversation_id, business_id, channel, customer_contact, direction, \
                       content, is_read, external_message_id, delivery, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        business_id: row.get(2)?,
        channel: parse_column(row, 3)?,
        customer_contact: row.get(4)?,
        direction: parse_column(row, 5)?,
        content: row.get(6)?,
        is_read: row.get(7)?,
        external_message_id: row.get(8)?,
        delivery: parse_optional_column(row, 9)?,
        created_at: row.get(10)?,
    })
}

/// Append a message.
///
/// Returns `false` without writing when the external message id was already
/// stored for the same business and channel.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<bool, OasisError> {
    let msg = msg.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO messages ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                     ON CONFLICT DO NOTHING"
                ),
                params![
                    msg.id,
                    msg.conversation_id,
                    msg.business_id,
                    msg.channel.to_string(),
                    msg.customer_contact,
                    msg.direction.to_string(),
                    msg.content,
                    msg.is_read,
                    msg.external_message_id,
                    msg.delivery.map(|d| d.to_string()),
                    msg.created_at,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(inserted > 0)
}

/// Get a conversation's messages in chronological order.
///
/// With a limit, returns the most recent `limit` messages (still oldest first).
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>, OasisError> {
    let conversation_id = conversation_id.to_string();
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.unwrap_or(-1);
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM (
                     SELECT {COLUMNS}, rowid AS seq FROM messages WHERE conversation_id = ?1
                     ORDER BY created_at DESC, seq DESC LIMIT ?2
                 ) ORDER BY created_at ASC, seq ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Mark every unread inbound message of a conversation read.
pub async fn mark_conversation_read(
    db: &Database,
    conversation_id: &str,
) -> Result<u64, OasisError> {
    let conversation_id = conversation_id.to_string();
    let inbound = Direction::Inbound.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE messages SET is_read = 1
                 WHERE conversation_id = ?1 AND direction = ?2 AND is_read = 0",
                params![conversation_id, inbound],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed as u64)
}

/// Count unread inbound messages across a business's conversations.
pub async fn unread_count(db: &Database, business_id: &str) -> Result<i64, OasisError> {
    let business_id = business_id.to_string();
    let inbound = Direction::Inbound.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE business_id = ?1 AND direction = ?2 AND is_read = 0",
                params![business_id, inbound],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::businesses::create_business;
    use crate::queries::conversations::upsert_conversation;
    use oasis_core::types::{Business, Conversation, DeliveryStatus, NewConversation, Platform};
    use tempfile::tempdir;

    async fn setup_db_with_conversation() -> (Database, Conversation, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let business = Business {
            id: "biz-1".to_string(),
            owner_id: None,
            slug: "cafe".to_string(),
            name: "Cafe".to_string(),
            category: Some("cafe".to_string()),
            integrations: Default::default(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        create_business(&db, &business).await.unwrap();
        let conv = upsert_conversation(
            &db,
            &NewConversation {
                business_id: "biz-1".to_string(),
                platform: Platform::Facebook,
                external_id: "987654321".to_string(),
                display_name: None,
                at: "2026-01-01T00:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();
        (db, conv, dir)
    }

    fn at(mut msg: Message, ts: &str) -> Message {
        msg.created_at = ts.to_string();
        msg
    }

    #[tokio::test]
    async fn insert_and_get_messages_in_order() {
        let (db, conv, _dir) = setup_db_with_conversation().await;

        let m1 = at(Message::inbound(&conv, "hello", None), "2026-01-01T00:00:01.000Z");
        let m2 = at(
            Message::outbound(&conv, "Welcome", DeliveryStatus::Sent),
            "2026-01-01T00:00:02.000Z",
        );
        let m3 = at(Message::inbound(&conv, "thanks", None), "2026-01-01T00:00:03.000Z");
        // Insert out of order.
        for m in [&m3, &m1, &m2] {
            assert!(insert_message(&db, m).await.unwrap());
        }

        let messages = get_messages_for_conversation(&db, &conv.id, None).await.unwrap();
        assert_eq!(messages, vec![m1, m2.clone(), m3.clone()]);
        assert_eq!(messages[1].delivery, Some(DeliveryStatus::Sent));
        assert_eq!(messages[1].direction, Direction::Outbound);

        let recent = get_messages_for_conversation(&db, &conv.id, Some(2)).await.unwrap();
        assert_eq!(recent, vec![m2, m3]);
    }

    #[tokio::test]
    async fn duplicate_external_id_is_not_stored_twice() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        let first = Message::inbound(&conv, "hi", Some("mid.1".to_string()));
        let redelivery = Message::inbound(&conv, "hi", Some("mid.1".to_string()));

        assert!(insert_message(&db, &first).await.unwrap());
        assert!(!insert_message(&db, &redelivery).await.unwrap());

        let messages = get_messages_for_conversation(&db, &conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn messages_without_external_id_never_collide() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        assert!(insert_message(&db, &Message::inbound(&conv, "a", None)).await.unwrap());
        assert!(insert_message(&db, &Message::inbound(&conv, "a", None)).await.unwrap());
        assert_eq!(unread_count(&db, "biz-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn message_requires_existing_conversation() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        let mut orphan = Message::inbound(&conv, "lost", None);
        orphan.conversation_id = "no-such-conversation".to_string();
        assert!(insert_message(&db, &orphan).await.is_err());
    }

    #[tokio::test]
    async fn mark_read_only_touches_inbound() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        insert_message(&db, &Message::inbound(&conv, "one", None)).await.unwrap();
        insert_message(&db, &Message::inbound(&conv, "two", None)).await.unwrap();
        insert_message(&db, &Message::outbound(&conv, "reply", DeliveryStatus::Skipped))
            .await
            .unwrap();
        assert_eq!(unread_count(&db, "biz-1").await.unwrap(), 2);

        assert_eq!(mark_conversation_read(&db, &conv.id).await.unwrap(), 2);
        assert_eq!(unread_count(&db, "biz-1").await.unwrap(), 0);
        assert_eq!(mark_conversation_read(&db, &conv.id).await.unwrap(), 0);
    }
}
