// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing gateway trait for subscription and checkout operations.

use async_trait::async_trait;

use crate::error::QuillError;

/// Opaque billing provider (Stripe-style).
///
/// Quill only needs four operations: create a customer keyed by phone,
/// check for an active subscription, and mint checkout/portal links.
/// Subscription lifecycle webhooks are out of scope.
#[async_trait]
pub trait BillingGateway: Send + Sync + 'static {
    /// Creates a billing customer for the given phone number.
    ///
    /// Returns the provider's customer id.
    async fn create_customer(&self, phone: &str) -> Result<String, QuillError>;

    /// Returns true if the customer has at least one active subscription.
    async fn has_active_subscription(&self, customer_id: &str) -> Result<bool, QuillError>;

    /// Creates a checkout session for the given price and returns its URL.
    async fn checkout_url(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<String, QuillError>;

    /// Creates a customer portal session and returns its URL.
    ///
    /// Returns `None` when the provider refuses to mint one (no billing
    /// history); callers treat that as "no active subscription".
    async fn portal_url(&self, customer_id: &str) -> Result<Option<String>, QuillError>;
}
