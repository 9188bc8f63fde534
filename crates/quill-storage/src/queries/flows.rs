// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow step-pointer CRUD operations.
//!
//! The `step` column is NULL for an unstarted flow. Stored values are
//! parsed into [`OptInStep`] at the row boundary; a value outside the
//! declared enum is a storage error, never a silently-propagated string.

use std::str::FromStr;

use quill_core::types::OptInStep;
use quill_core::QuillError;
use rusqlite::params;

use crate::database::{is_unique_violation, Database};
use crate::models::FlowRecord;

fn parse_step(raw: Option<String>) -> Result<Option<OptInStep>, rusqlite::Error> {
    match raw {
        None => Ok(None),
        Some(s) => OptInStep::from_str(&s).map(Some).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("undeclared flow step `{s}`").into(),
            )
        }),
    }
}

/// Get a flow row for (flow id, user).
pub async fn get(
    db: &Database,
    flow_id: &str,
    user_id: &str,
) -> Result<Option<FlowRecord>, QuillError> {
    let flow_id = flow_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, step, created_at, updated_at
                 FROM flows WHERE id = ?1 AND user_id = ?2",
            )?;
            let result = stmt.query_row(params![flow_id, user_id], |row| {
                Ok(FlowRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    step: parse_step(row.get(2)?)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            });
            match result {
                Ok(flow) => Ok(Some(flow)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create a flow row with a NULL (unstarted) step.
///
/// Losing a concurrent-create race is not an error.
pub async fn create(db: &Database, flow_id: &str, user_id: &str) -> Result<(), QuillError> {
    let flow_id = flow_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            match conn.execute(
                "INSERT INTO flows (id, user_id) VALUES (?1, ?2)",
                params![flow_id, user_id],
            ) {
                Ok(_) => Ok(()),
                Err(ref e) if is_unique_violation(e) => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Advance the persisted step pointer.
///
/// Accepting [`OptInStep`] (not a string) guarantees no undeclared value
/// can ever be written.
pub async fn set_step(
    db: &Database,
    flow_id: &str,
    user_id: &str,
    step: OptInStep,
) -> Result<(), QuillError> {
    let flow_id = flow_id.to_string();
    let user_id = user_id.to_string();
    let step = step.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE flows SET step = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND user_id = ?3",
                params![step, flow_id, user_id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(QuillError::Precondition(
            "cannot update step of nonexistent flow".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;
    use tempfile::tempdir;

    async fn setup_db_with_user() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        users::create_with_phone(&db, "u1", "+15551230001")
            .await
            .unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_starts_unstarted() {
        let (db, _dir) = setup_db_with_user().await;

        create(&db, "onboarding", "u1").await.unwrap();
        let flow = get(&db, "onboarding", "u1").await.unwrap().unwrap();
        assert!(flow.step.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_step_round_trips_every_declared_value() {
        let (db, _dir) = setup_db_with_user().await;
        create(&db, "onboarding", "u1").await.unwrap();

        for step in [
            OptInStep::Confirmation,
            OptInStep::Name,
            OptInStep::Email,
            OptInStep::Complete,
        ] {
            set_step(&db, "onboarding", "u1", step).await.unwrap();
            let flow = get(&db, "onboarding", "u1").await.unwrap().unwrap();
            assert_eq!(flow.step, Some(step));
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn undeclared_stored_step_is_rejected_on_read() {
        let (db, _dir) = setup_db_with_user().await;
        create(&db, "onboarding", "u1").await.unwrap();

        // Corrupt the row behind the typed API's back.
        db.connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "UPDATE flows SET step = 'limbo' WHERE id = 'onboarding' AND user_id = 'u1'",
                    [],
                )
            })
            .await
            .unwrap();

        let result = get(&db, "onboarding", "u1").await;
        assert!(matches!(result, Err(QuillError::Storage { .. })));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_step_on_missing_flow_fails_precondition() {
        let (db, _dir) = setup_db_with_user().await;
        let result = set_step(&db, "onboarding", "u1", OptInStep::Confirmation).await;
        assert!(matches!(result, Err(QuillError::Precondition(_))));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn flows_are_scoped_per_user() {
        let (db, _dir) = setup_db_with_user().await;
        users::create_with_phone(&db, "u2", "+15551230002")
            .await
            .unwrap();

        create(&db, "onboarding", "u1").await.unwrap();
        create(&db, "onboarding", "u2").await.unwrap();
        set_step(&db, "onboarding", "u1", OptInStep::Name).await.unwrap();

        let flow1 = get(&db, "onboarding", "u1").await.unwrap().unwrap();
        let flow2 = get(&db, "onboarding", "u2").await.unwrap().unwrap();
        assert_eq!(flow1.step, Some(OptInStep::Name));
        assert!(flow2.step.is_none());

        db.close().await.unwrap();
    }
}
