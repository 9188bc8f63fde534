// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock billing gateway with configurable subscription state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quill_core::{BillingGateway, QuillError};

/// A billing gateway returning canned answers.
///
/// Customers are assigned sequential `cus-mock-N` ids. Subscription
/// state and portal availability are toggled per test.
#[derive(Clone, Default)]
pub struct MockBilling {
    customers: Arc<Mutex<Vec<String>>>,
    subscribed: Arc<Mutex<bool>>,
    portal_available: Arc<Mutex<bool>>,
}

impl MockBilling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether `has_active_subscription` reports true.
    pub async fn set_subscribed(&self, subscribed: bool) {
        *self.subscribed.lock().await = subscribed;
    }

    /// Sets whether `portal_url` returns a link.
    pub async fn set_portal_available(&self, available: bool) {
        *self.portal_available.lock().await = available;
    }

    /// Phone numbers customers were created for, in order.
    pub async fn customers(&self) -> Vec<String> {
        self.customers.lock().await.clone()
    }
}

#[async_trait]
impl BillingGateway for MockBilling {
    async fn create_customer(&self, phone: &str) -> Result<String, QuillError> {
        let mut customers = self.customers.lock().await;
        customers.push(phone.to_string());
        Ok(format!("cus-mock-{}", customers.len()))
    }

    async fn has_active_subscription(&self, _customer_id: &str) -> Result<bool, QuillError> {
        Ok(*self.subscribed.lock().await)
    }

    async fn checkout_url(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<String, QuillError> {
        Ok(format!(
            "https://billing.example.com/checkout/{customer_id}/{price_id}"
        ))
    }

    async fn portal_url(&self, customer_id: &str) -> Result<Option<String>, QuillError> {
        if *self.portal_available.lock().await {
            Ok(Some(format!(
                "https://billing.example.com/portal/{customer_id}"
            )))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_to_unsubscribed_without_portal() {
        let billing = MockBilling::new();
        let customer = billing.create_customer("+15550001111").await.unwrap();
        assert!(!billing.has_active_subscription(&customer).await.unwrap());
        assert!(billing.portal_url(&customer).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggles_apply() {
        let billing = MockBilling::new();
        billing.set_subscribed(true).await;
        billing.set_portal_available(true).await;
        assert!(billing.has_active_subscription("cus-1").await.unwrap());
        assert!(billing.portal_url("cus-1").await.unwrap().is_some());
    }
}
