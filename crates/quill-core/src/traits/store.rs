// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for Quill's durable state.
//!
//! All flow, subscription, message, and usage state lives behind this
//! trait. There is no in-memory caching of any of it across requests:
//! every decision re-reads the store, which is the single source of
//! truth between concurrently-running webhook invocations.

use async_trait::async_trait;

use crate::error::QuillError;
use crate::types::{
    Campaign, CampaignMember, FlowRecord, MessageRecord, MessageRole, OptInStep, Submission,
    UsageMetric, User,
};

/// Storage backend for all durable entities.
///
/// Update operations against a nonexistent row return
/// [`QuillError::Precondition`]; writes that violate a uniqueness
/// constraint return [`QuillError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // --- User operations ---

    /// Looks up a user by phone number.
    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, QuillError>;

    /// Looks up a user by id.
    async fn get_user(&self, id: &str) -> Result<Option<User>, QuillError>;

    /// Creates a user with only the phone number set.
    ///
    /// Returns [`QuillError::Conflict`] if the phone is already taken,
    /// which callers resolve by re-fetching.
    async fn create_user_with_phone(&self, id: &str, phone: &str) -> Result<(), QuillError>;

    /// Sets the user's display name.
    async fn set_user_name(&self, id: &str, name: &str) -> Result<(), QuillError>;

    /// Sets the user's email. Returns [`QuillError::Conflict`] when the
    /// email belongs to another account.
    async fn set_user_email(&self, id: &str, email: &str) -> Result<(), QuillError>;

    /// Links a billing customer id to the user.
    async fn set_billing_customer(
        &self,
        id: &str,
        customer_id: &str,
    ) -> Result<(), QuillError>;

    // --- Campaign operations ---

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, QuillError>;

    async fn create_campaign(&self, id: &str, active: bool) -> Result<(), QuillError>;

    async fn get_membership(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<Option<CampaignMember>, QuillError>;

    /// Creates an unsubscribed membership row for the pair.
    async fn create_membership(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<(), QuillError>;

    async fn set_subscribed(
        &self,
        user_id: &str,
        campaign_id: &str,
        subscribed: bool,
    ) -> Result<(), QuillError>;

    // --- Flow operations ---

    async fn get_flow(
        &self,
        flow_id: &str,
        user_id: &str,
    ) -> Result<Option<FlowRecord>, QuillError>;

    /// Creates a flow row with a NULL (unstarted) step.
    async fn create_flow(&self, flow_id: &str, user_id: &str) -> Result<(), QuillError>;

    /// Advances the persisted step pointer.
    ///
    /// Only declared [`OptInStep`] values can ever be written; the raw
    /// string never crosses this boundary.
    async fn set_flow_step(
        &self,
        flow_id: &str,
        user_id: &str,
        step: OptInStep,
    ) -> Result<(), QuillError>;

    // --- Message operations ---

    /// Appends a message. Messages are never updated or deleted.
    async fn insert_message(&self, msg: &MessageRecord) -> Result<(), QuillError>;

    /// Returns the thread's messages in chronological order
    /// (creation timestamp ascending, insertion order on ties).
    async fn list_messages(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> Result<Vec<MessageRecord>, QuillError>;

    /// Counts the user's messages with the given role across all threads.
    async fn count_messages_by_role(
        &self,
        user_id: &str,
        role: MessageRole,
    ) -> Result<i64, QuillError>;

    // --- Usage metrics ---

    /// Appends a usage ledger row.
    async fn record_usage(&self, metric: &UsageMetric) -> Result<(), QuillError>;

    // --- Completion submissions (outbox) ---

    async fn create_submission(&self, submission: &Submission) -> Result<(), QuillError>;

    async fn get_submission(&self, id: &str) -> Result<Option<Submission>, QuillError>;

    /// Atomically transitions a submission from pending to delivered.
    ///
    /// Returns `false` when the submission was already delivered, letting
    /// the completion callback deduplicate at-least-once redeliveries.
    async fn mark_submission_delivered(&self, id: &str) -> Result<bool, QuillError>;
}
