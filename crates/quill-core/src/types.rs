// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across gateway traits and the Quill backend.
//!
//! Entity structs mirror the storage schema one-to-one. Timestamps are
//! ISO 8601 UTC strings with millisecond precision, matching the SQLite
//! `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` defaults.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Thread every SMS conversation currently lives in. Multi-thread
/// support exists in the schema but not yet in the product surface.
pub const DEFAULT_THREAD: &str = "default";

/// Current UTC time as an ISO 8601 string with millisecond precision.
///
/// The same shape SQLite produces for column defaults, so stored
/// timestamps sort consistently regardless of which side generated them.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Unique identifier for a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The role a stored message was authored under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// The kind of event a usage metric records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UsageEvent {
    Completion,
    Sms,
}

/// The unit a usage metric's value is denominated in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UsageUnit {
    Tokens,
    Count,
}

/// Steps of the opt-in onboarding flow, in strict forward order.
///
/// The persisted step column is `NULL` for a flow that has not started;
/// that unstarted state is `Option::None` at the type level, never a
/// variant here. Unknown stored values are rejected at the storage
/// boundary when rows are decoded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OptInStep {
    Confirmation,
    Name,
    Email,
    Complete,
}

/// Delivery state of an asynchronous completion submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Delivered,
}

/// A user row. The identity anchor for all other entities.
///
/// Invariant: at least one of `phone` / `email` is set (enforced by a
/// CHECK constraint in the schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub billing_customer_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A campaign row: a named, independently toggleable dialogue context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub active: bool,
    pub created_at: String,
}

/// Join row between a user and a campaign.
///
/// Absence of a row means "never interacted"; `subscribed = false` means
/// the user explicitly opted out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignMember {
    pub user_id: String,
    pub campaign_id: String,
    pub subscribed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-(flow, user) pointer into a named state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    pub id: String,
    pub user_id: String,
    /// `None` = the flow has not started for this user.
    pub step: Option<OptInStep>,
    pub created_at: String,
    pub updated_at: String,
}

/// An ordered conversational record. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub user_id: String,
    pub role: MessageRole,
    pub content: String,
    pub thread_id: String,
    pub created_at: String,
}

/// An append-only usage ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetric {
    pub id: String,
    pub user_id: String,
    pub event: UsageEvent,
    /// Id of the message this metric refers to, when applicable.
    pub event_id: Option<String>,
    pub unit: UsageUnit,
    pub value: i64,
    pub created_at: String,
}

/// Outbox/correlation record for one asynchronous completion dispatch.
///
/// Created before the job is handed to the completion gateway so the
/// eventual callback can be correlated and deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    /// The inbound message that triggered the submission.
    pub message_id: String,
    /// Phone number the generated reply will be delivered to.
    pub recipient: String,
    pub status: SubmissionStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// One turn of chat history in the shape the completion provider expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// A fully-assembled asynchronous completion request.
///
/// Carries the correlation data the callback needs to locate where to
/// deliver the reply and which metrics to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionJob {
    pub submission_id: String,
    pub user_id: String,
    /// Id of the originating inbound message.
    pub message_id: String,
    /// Phone number to deliver the generated reply to.
    pub recipient: String,
    /// Full chat history in chronological order.
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn opt_in_step_round_trips_through_strings() {
        let steps = [
            OptInStep::Confirmation,
            OptInStep::Name,
            OptInStep::Email,
            OptInStep::Complete,
        ];
        for step in steps {
            let s = step.to_string();
            assert_eq!(OptInStep::from_str(&s).unwrap(), step);
        }
    }

    #[test]
    fn opt_in_step_serializes_lowercase() {
        assert_eq!(OptInStep::Confirmation.to_string(), "confirmation");
        assert_eq!(OptInStep::Complete.to_string(), "complete");
        assert!(OptInStep::from_str("onboarding").is_err());
    }

    #[test]
    fn message_role_parses_stored_values() {
        assert_eq!(MessageRole::from_str("user").unwrap(), MessageRole::User);
        assert_eq!(
            MessageRole::from_str("assistant").unwrap(),
            MessageRole::Assistant
        );
        assert!(MessageRole::from_str("bot").is_err());
    }

    #[test]
    fn usage_enums_display_lowercase() {
        assert_eq!(UsageEvent::Completion.to_string(), "completion");
        assert_eq!(UsageEvent::Sms.to_string(), "sms");
        assert_eq!(UsageUnit::Tokens.to_string(), "tokens");
        assert_eq!(UsageUnit::Count.to_string(), "count");
    }

    #[test]
    fn completion_job_serializes() {
        let job = CompletionJob {
            submission_id: "sub-1".into(),
            user_id: "user-1".into(),
            message_id: "msg-1".into(),
            recipient: "+15551234567".into(),
            messages: vec![ChatMessage {
                role: MessageRole::User,
                content: "hi".into(),
            }],
        };
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        let parsed: CompletionJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.messages, job.messages);
    }
}
