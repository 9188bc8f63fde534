// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use quill_core::QuillError;
use rusqlite::params;

use crate::database::{is_unique_violation, Database};
use crate::models::User;

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        phone: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        billing_customer_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str =
    "id, phone, email, name, billing_customer_id, created_at, updated_at";

/// Look up a user by phone number.
pub async fn find_by_phone(db: &Database, phone: &str) -> Result<Option<User>, QuillError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE phone = ?1"
            ))?;
            let result = stmt.query_row(params![phone], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a user by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<User>, QuillError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create a user with only the phone set.
///
/// A concurrent creation for the same phone loses the UNIQUE race; that
/// outcome is surfaced as [`QuillError::Conflict`] so the caller can
/// re-fetch the winning row.
pub async fn create_with_phone(db: &Database, id: &str, phone: &str) -> Result<(), QuillError> {
    let id = id.to_string();
    let phone = phone.to_string();
    let inserted = db
        .connection()
        .call(move |conn| {
            match conn.execute(
                "INSERT INTO users (id, phone) VALUES (?1, ?2)",
                params![id, phone],
            ) {
                Ok(_) => Ok(true),
                Err(ref e) if is_unique_violation(e) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(QuillError::Conflict {
            field: "phone".to_string(),
        })
    }
}

/// Set the user's display name.
pub async fn set_name(db: &Database, id: &str, name: &str) -> Result<(), QuillError> {
    let id = id.to_string();
    let name = name.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET name = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![name, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(QuillError::Precondition(
            "cannot update name of nonexistent user".to_string(),
        ));
    }
    Ok(())
}

/// Set the user's email.
///
/// Returns [`QuillError::Conflict`] when the email belongs to another
/// account, [`QuillError::Precondition`] when the user does not exist.
pub async fn set_email(db: &Database, id: &str, email: &str) -> Result<(), QuillError> {
    let id = id.to_string();
    let email = email.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            match conn.execute(
                "UPDATE users SET email = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![email, id],
            ) {
                Ok(n) => Ok(Some(n)),
                Err(ref e) if is_unique_violation(e) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        None => Err(QuillError::Conflict {
            field: "email".to_string(),
        }),
        Some(0) => Err(QuillError::Precondition(
            "cannot update email of nonexistent user".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

/// Link a billing customer id to the user.
pub async fn set_billing_customer(
    db: &Database,
    id: &str,
    customer_id: &str,
) -> Result<(), QuillError> {
    let id = id.to_string();
    let customer_id = customer_id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET billing_customer_id = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![customer_id, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(QuillError::Precondition(
            "cannot link billing customer to nonexistent user".to_string(),
        ));
    }
    Ok(())
}
