// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion submission (outbox) operations.
//!
//! A submission row is created before a completion job is dispatched, so
//! the eventual callback can be correlated and deduplicated. Delivery
//! marking is an atomic pending -> delivered transition: the callback may
//! arrive more than once, but only the first transition wins.

use std::str::FromStr;

use quill_core::types::SubmissionStatus;
use quill_core::QuillError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Submission;

fn parse_status(raw: String) -> Result<SubmissionStatus, rusqlite::Error> {
    SubmissionStatus::from_str(&raw).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("undeclared submission status `{raw}`").into(),
        )
    })
}

/// Create a pending submission row.
pub async fn create(db: &Database, submission: &Submission) -> Result<(), QuillError> {
    let submission = submission.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO submissions (id, user_id, message_id, recipient, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    submission.id,
                    submission.user_id,
                    submission.message_id,
                    submission.recipient,
                    submission.status.to_string(),
                    submission.created_at,
                    submission.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a submission by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Submission>, QuillError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, message_id, recipient, status, created_at, updated_at
                 FROM submissions WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Submission {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    message_id: row.get(2)?,
                    recipient: row.get(3)?,
                    status: parse_status(row.get(4)?)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            });
            match result {
                Ok(submission) => Ok(Some(submission)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically transition a submission from pending to delivered.
///
/// Returns `true` when this call performed the transition, `false` when
/// the submission was already delivered (a redelivered callback).
/// A missing submission is a precondition failure.
pub async fn mark_delivered(db: &Database, id: &str) -> Result<bool, QuillError> {
    let id = id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE submissions SET status = 'delivered',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'pending'",
                params![id],
            )?;
            if updated > 0 {
                return Ok(Some(true));
            }
            // No pending row: either already delivered or unknown id.
            let exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM submissions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(if exists > 0 { Some(false) } else { None })
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    outcome.ok_or_else(|| {
        QuillError::Precondition("cannot mark delivery of nonexistent submission".to_string())
    })
}
