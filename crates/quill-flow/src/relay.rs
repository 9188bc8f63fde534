// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation relay: persists the inbound message and dispatches an
//! asynchronous completion request.
//!
//! The relay never produces a synchronous reply. It records the message,
//! rebuilds the ordered history, writes the outbox row, and hands the
//! job to the completion gateway; the generated reply arrives later
//! through the internal completion callback. The webhook response must
//! never block on generation, so `submit` implementations return as soon
//! as the job is handed off.

use std::sync::Arc;

use tracing::debug;

use quill_core::types::{
    now_iso, ChatMessage, CompletionJob, MessageRecord, MessageRole, Submission,
    SubmissionStatus, UsageEvent, UsageMetric, UsageUnit, DEFAULT_THREAD,
};
use quill_core::{CompletionGateway, QuillError, Store};

/// Persists chat history and dispatches asynchronous completion requests.
pub struct ConversationRelay {
    store: Arc<dyn Store>,
    completion: Arc<dyn CompletionGateway>,
    /// Optional persona instruction prefixed as a system message.
    system_prompt: Option<String>,
}

impl ConversationRelay {
    pub fn new(
        store: Arc<dyn Store>,
        completion: Arc<dyn CompletionGateway>,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            store,
            completion,
            system_prompt,
        }
    }

    /// Relays one inbound message into the AI path.
    ///
    /// Always "replies" with nothing; the actual reply is delivered
    /// out-of-band once generation finishes.
    pub async fn relay(
        &self,
        user_id: &str,
        content: &str,
        sender: &str,
    ) -> Result<(), QuillError> {
        let inbound = MessageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            role: MessageRole::User,
            content: content.to_string(),
            thread_id: DEFAULT_THREAD.to_string(),
            created_at: now_iso(),
        };
        self.store.insert_message(&inbound).await?;

        // Re-read the full thread so the prompt reflects exactly what is
        // persisted, in insertion order.
        let history = self.store.list_messages(user_id, DEFAULT_THREAD).await?;
        let latest_id = history
            .last()
            .map(|m| m.id.clone())
            .unwrap_or_else(|| inbound.id.clone());

        self.store
            .record_usage(&UsageMetric {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                event: UsageEvent::Sms,
                event_id: Some(latest_id.clone()),
                unit: UsageUnit::Count,
                value: 1,
                created_at: now_iso(),
            })
            .await?;

        let submission = Submission {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message_id: latest_id.clone(),
            recipient: sender.to_string(),
            status: SubmissionStatus::Pending,
            created_at: now_iso(),
            updated_at: now_iso(),
        };
        self.store.create_submission(&submission).await?;

        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(ref prompt) = self.system_prompt {
            messages.push(ChatMessage {
                role: MessageRole::System,
                content: prompt.clone(),
            });
        }
        messages.extend(history.iter().map(|m| ChatMessage {
            role: m.role,
            content: m.content.clone(),
        }));

        debug!(
            user_id = %user_id,
            submission_id = %submission.id,
            history_len = messages.len(),
            "dispatching completion job"
        );

        self.completion
            .submit(CompletionJob {
                submission_id: submission.id,
                user_id: user_id.to_string(),
                message_id: latest_id,
                recipient: sender.to_string(),
                messages,
            })
            .await
    }
}
