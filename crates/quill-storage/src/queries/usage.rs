// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger operations. Rows are append-only and never mutated.

use quill_core::QuillError;
use rusqlite::params;

use crate::database::Database;
use crate::models::UsageMetric;

/// Append a usage ledger row.
pub async fn record(db: &Database, metric: &UsageMetric) -> Result<(), QuillError> {
    let metric = metric.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO usage_metrics (id, user_id, event, event_id, unit, value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    metric.id,
                    metric.user_id,
                    metric.event.to_string(),
                    metric.event_id,
                    metric.unit.to_string(),
                    metric.value,
                    metric.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Sum of recorded values for a (user, event) pair. Reporting helper.
pub async fn total_for_event(
    db: &Database,
    user_id: &str,
    event: quill_core::types::UsageEvent,
) -> Result<i64, QuillError> {
    let user_id = user_id.to_string();
    let event = event.to_string();
    db.connection()
        .call(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(value), 0) FROM usage_metrics
                 WHERE user_id = ?1 AND event = ?2",
                params![user_id, event],
                |row| row.get(0),
            )?;
            Ok(total)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
