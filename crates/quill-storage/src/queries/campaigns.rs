// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign and campaign-membership CRUD operations.

use quill_core::QuillError;
use rusqlite::params;

use crate::database::{is_unique_violation, Database};
use crate::models::{Campaign, CampaignMember};

/// Get a campaign by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Campaign>, QuillError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, active, created_at FROM campaigns WHERE id = ?1")?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Campaign {
                    id: row.get(0)?,
                    active: row.get(1)?,
                    created_at: row.get(2)?,
                })
            });
            match result {
                Ok(campaign) => Ok(Some(campaign)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create a campaign.
///
/// A concurrent create of the same campaign id is not an error; the
/// existing row wins.
pub async fn create(db: &Database, id: &str, active: bool) -> Result<(), QuillError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            match conn.execute(
                "INSERT INTO campaigns (id, active) VALUES (?1, ?2)",
                params![id, active],
            ) {
                Ok(_) => Ok(()),
                Err(ref e) if is_unique_violation(e) => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user's membership row for a campaign.
pub async fn get_membership(
    db: &Database,
    user_id: &str,
    campaign_id: &str,
) -> Result<Option<CampaignMember>, QuillError> {
    let user_id = user_id.to_string();
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, campaign_id, subscribed, created_at, updated_at
                 FROM campaign_members WHERE user_id = ?1 AND campaign_id = ?2",
            )?;
            let result = stmt.query_row(params![user_id, campaign_id], |row| {
                Ok(CampaignMember {
                    user_id: row.get(0)?,
                    campaign_id: row.get(1)?,
                    subscribed: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            });
            match result {
                Ok(member) => Ok(Some(member)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create an unsubscribed membership row for the pair.
///
/// Losing a concurrent-create race is not an error.
pub async fn create_membership(
    db: &Database,
    user_id: &str,
    campaign_id: &str,
) -> Result<(), QuillError> {
    let user_id = user_id.to_string();
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| {
            match conn.execute(
                "INSERT INTO campaign_members (user_id, campaign_id) VALUES (?1, ?2)",
                params![user_id, campaign_id],
            ) {
                Ok(_) => Ok(()),
                Err(ref e) if is_unique_violation(e) => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flip a membership's subscribed flag.
pub async fn set_subscribed(
    db: &Database,
    user_id: &str,
    campaign_id: &str,
    subscribed: bool,
) -> Result<(), QuillError> {
    let user_id = user_id.to_string();
    let campaign_id = campaign_id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE campaign_members SET subscribed = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE user_id = ?2 AND campaign_id = ?3",
                params![subscribed, user_id, campaign_id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(QuillError::Precondition(
            "cannot update subscription of nonexistent membership".to_string(),
        ));
    }
    Ok(())
}
