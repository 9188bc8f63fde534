// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage gate: decides whether the fallback AI path is permitted.
//!
//! A user is allowed when billing shows an active subscription OR their
//! historical assistant-reply count is still under the free-trial
//! allowance. The count is re-read from storage on every decision.

use std::sync::Arc;

use quill_core::types::{MessageRole, User};
use quill_core::{BillingGateway, QuillError, Store};

/// Outcome of a usage gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageDecision {
    /// Whether the AI path may run.
    pub allowed: bool,
    /// True for an unsubscribed user's very first AI exchange; triggers
    /// the one-time welcome message.
    pub first_free: bool,
}

/// Gates the AI fallback path on subscription state and trial usage.
pub struct UsageGate {
    store: Arc<dyn Store>,
    billing: Arc<dyn BillingGateway>,
    free_messages: i64,
}

impl UsageGate {
    pub fn new(
        store: Arc<dyn Store>,
        billing: Arc<dyn BillingGateway>,
        free_messages: i64,
    ) -> Self {
        Self {
            store,
            billing,
            free_messages,
        }
    }

    /// Checks whether the AI path should serve this user.
    pub async fn check(&self, user: &User) -> Result<UsageDecision, QuillError> {
        let count = self
            .store
            .count_messages_by_role(&user.id, MessageRole::Assistant)
            .await?;

        let subscribed = match user.billing_customer_id {
            Some(ref customer_id) => self.billing.has_active_subscription(customer_id).await?,
            None => false,
        };

        Ok(UsageDecision {
            allowed: subscribed || count < self.free_messages,
            first_free: !subscribed && count == 0,
        })
    }
}
