// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the Store trait.

use async_trait::async_trait;
use tracing::debug;

use quill_core::types::{
    Campaign, CampaignMember, FlowRecord, MessageRecord, MessageRole, OptInStep, Submission,
    UsageMetric, User,
};
use quill_core::{QuillError, Store};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open (or create) the backing database and return a ready store.
    pub async fn open(path: &str) -> Result<Self, QuillError> {
        let db = Database::open(path).await?;
        debug!(path = %path, "SQLite store initialized");
        Ok(Self { db })
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), QuillError> {
        self.db.close().await
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Store for SqliteStore {
    // --- User operations ---

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, QuillError> {
        queries::users::find_by_phone(&self.db, phone).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, QuillError> {
        queries::users::get(&self.db, id).await
    }

    async fn create_user_with_phone(&self, id: &str, phone: &str) -> Result<(), QuillError> {
        queries::users::create_with_phone(&self.db, id, phone).await
    }

    async fn set_user_name(&self, id: &str, name: &str) -> Result<(), QuillError> {
        queries::users::set_name(&self.db, id, name).await
    }

    async fn set_user_email(&self, id: &str, email: &str) -> Result<(), QuillError> {
        queries::users::set_email(&self.db, id, email).await
    }

    async fn set_billing_customer(
        &self,
        id: &str,
        customer_id: &str,
    ) -> Result<(), QuillError> {
        queries::users::set_billing_customer(&self.db, id, customer_id).await
    }

    // --- Campaign operations ---

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, QuillError> {
        queries::campaigns::get(&self.db, id).await
    }

    async fn create_campaign(&self, id: &str, active: bool) -> Result<(), QuillError> {
        queries::campaigns::create(&self.db, id, active).await
    }

    async fn get_membership(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<Option<CampaignMember>, QuillError> {
        queries::campaigns::get_membership(&self.db, user_id, campaign_id).await
    }

    async fn create_membership(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<(), QuillError> {
        queries::campaigns::create_membership(&self.db, user_id, campaign_id).await
    }

    async fn set_subscribed(
        &self,
        user_id: &str,
        campaign_id: &str,
        subscribed: bool,
    ) -> Result<(), QuillError> {
        queries::campaigns::set_subscribed(&self.db, user_id, campaign_id, subscribed).await
    }

    // --- Flow operations ---

    async fn get_flow(
        &self,
        flow_id: &str,
        user_id: &str,
    ) -> Result<Option<FlowRecord>, QuillError> {
        queries::flows::get(&self.db, flow_id, user_id).await
    }

    async fn create_flow(&self, flow_id: &str, user_id: &str) -> Result<(), QuillError> {
        queries::flows::create(&self.db, flow_id, user_id).await
    }

    async fn set_flow_step(
        &self,
        flow_id: &str,
        user_id: &str,
        step: OptInStep,
    ) -> Result<(), QuillError> {
        queries::flows::set_step(&self.db, flow_id, user_id, step).await
    }

    // --- Message operations ---

    async fn insert_message(&self, msg: &MessageRecord) -> Result<(), QuillError> {
        queries::messages::insert(&self.db, msg).await
    }

    async fn list_messages(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> Result<Vec<MessageRecord>, QuillError> {
        queries::messages::list_for_thread(&self.db, user_id, thread_id).await
    }

    async fn count_messages_by_role(
        &self,
        user_id: &str,
        role: MessageRole,
    ) -> Result<i64, QuillError> {
        queries::messages::count_by_role(&self.db, user_id, role).await
    }

    // --- Usage metrics ---

    async fn record_usage(&self, metric: &UsageMetric) -> Result<(), QuillError> {
        queries::usage::record(&self.db, metric).await
    }

    // --- Completion submissions ---

    async fn create_submission(&self, submission: &Submission) -> Result<(), QuillError> {
        queries::submissions::create(&self.db, submission).await
    }

    async fn get_submission(&self, id: &str) -> Result<Option<Submission>, QuillError> {
        queries::submissions::get(&self.db, id).await
    }

    async fn mark_submission_delivered(&self, id: &str) -> Result<bool, QuillError> {
        queries::submissions::mark_delivered(&self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::types::now_iso;
    use tempfile::tempdir;

    #[tokio::test]
    async fn full_user_lifecycle_through_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::open(db_path.to_str().unwrap()).await.unwrap();

        store
            .create_user_with_phone("u1", "+15551230001")
            .await
            .unwrap();
        let user = store
            .find_user_by_phone("+15551230001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, "u1");

        store.create_campaign("launch-updates", true).await.unwrap();
        store.create_membership("u1", "launch-updates").await.unwrap();
        store.create_flow("onboarding", "u1").await.unwrap();
        store
            .set_flow_step("onboarding", "u1", OptInStep::Confirmation)
            .await
            .unwrap();

        let flow = store.get_flow("onboarding", "u1").await.unwrap().unwrap();
        assert_eq!(flow.step, Some(OptInStep::Confirmation));

        let msg = MessageRecord {
            id: "m1".to_string(),
            user_id: "u1".to_string(),
            role: MessageRole::User,
            content: "hello".to_string(),
            thread_id: "default".to_string(),
            created_at: now_iso(),
        };
        store.insert_message(&msg).await.unwrap();
        assert_eq!(
            store
                .count_messages_by_role("u1", MessageRole::User)
                .await
                .unwrap(),
            1
        );

        store.close().await.unwrap();
    }
}
