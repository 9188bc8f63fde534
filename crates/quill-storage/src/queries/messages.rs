// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.
//!
//! Messages are append-only. History reads order by creation timestamp
//! ascending with rowid as the tie-break, so the order is deterministic
//! even when two inserts land in the same millisecond — this ordering
//! becomes the literal prompt history sent to the completion provider.

use std::str::FromStr;

use quill_core::types::MessageRole;
use quill_core::QuillError;
use rusqlite::params;

use crate::database::Database;
use crate::models::MessageRecord;

fn parse_role(raw: String) -> Result<MessageRole, rusqlite::Error> {
    MessageRole::from_str(&raw).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("undeclared message role `{raw}`").into(),
        )
    })
}

/// Append a message.
pub async fn insert(db: &Database, msg: &MessageRecord) -> Result<(), QuillError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, role, content, thread_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.id,
                    msg.user_id,
                    msg.role.to_string(),
                    msg.content,
                    msg.thread_id,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a thread's messages in chronological order.
pub async fn list_for_thread(
    db: &Database,
    user_id: &str,
    thread_id: &str,
) -> Result<Vec<MessageRecord>, QuillError> {
    let user_id = user_id.to_string();
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, role, content, thread_id, created_at
                 FROM messages WHERE user_id = ?1 AND thread_id = ?2
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![user_id, thread_id], |row| {
                Ok(MessageRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: parse_role(row.get(2)?)?,
                    content: row.get(3)?,
                    thread_id: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count the user's messages with the given role across all threads.
pub async fn count_by_role(
    db: &Database,
    user_id: &str,
    role: MessageRole,
) -> Result<i64, QuillError> {
    let user_id = user_id.to_string();
    let role = role.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE user_id = ?1 AND role = ?2",
                params![user_id, role],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
