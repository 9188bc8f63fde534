// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stripe-compatible billing client.
//!
//! Implements [`BillingGateway`] over the provider's REST API
//! (form-encoded POSTs, bearer auth). Quill treats billing as an opaque
//! service: create a customer keyed by phone, check for an active
//! subscription, and mint checkout/portal links.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use quill_core::{BillingGateway, QuillError};

/// Base URL for the billing REST API.
const API_BASE_URL: &str = "https://api.stripe.com";

/// Redirect/return targets embedded in checkout and portal sessions.
#[derive(Debug, Clone)]
pub struct BillingUrls {
    pub success_url: String,
    pub cancel_url: String,
    pub return_url: String,
}

/// HTTP client for the billing provider.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    urls: BillingUrls,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: String,
}

impl StripeClient {
    /// Creates a new billing client.
    pub fn new(secret_key: String, urls: BillingUrls) -> Result<Self, QuillError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| QuillError::Billing {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            secret_key,
            urls,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, QuillError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| QuillError::Billing {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, path = %path, "billing response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuillError::Billing {
                message: format!("billing API returned {status}: {body}"),
                source: None,
            });
        }

        response.json().await.map_err(|e| QuillError::Billing {
            message: format!("failed to parse billing response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl BillingGateway for StripeClient {
    async fn create_customer(&self, phone: &str) -> Result<String, QuillError> {
        let customer: CustomerResponse = self
            .post_form("/v1/customers", &[("phone", phone)])
            .await?;
        Ok(customer.id)
    }

    async fn has_active_subscription(&self, customer_id: &str) -> Result<bool, QuillError> {
        let response = self
            .client
            .get(format!("{}/v1/subscriptions", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&[("customer", customer_id), ("status", "active")])
            .send()
            .await
            .map_err(|e| QuillError::Billing {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuillError::Billing {
                message: format!("subscription list failed with {status}: {body}"),
                source: None,
            });
        }

        let list: SubscriptionListResponse =
            response.json().await.map_err(|e| QuillError::Billing {
                message: format!("failed to parse subscription list: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(!list.data.is_empty())
    }

    async fn checkout_url(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<String, QuillError> {
        let session: SessionResponse = self
            .post_form(
                "/v1/checkout/sessions",
                &[
                    ("success_url", self.urls.success_url.as_str()),
                    ("cancel_url", self.urls.cancel_url.as_str()),
                    ("customer", customer_id),
                    ("line_items[0][price]", price_id),
                    ("line_items[0][quantity]", "1"),
                    ("mode", "subscription"),
                ],
            )
            .await?;
        Ok(session.url)
    }

    async fn portal_url(&self, customer_id: &str) -> Result<Option<String>, QuillError> {
        // Portal creation fails for customers with no billing history;
        // that reads as "nothing to manage", not as an error.
        let result: Result<SessionResponse, QuillError> = self
            .post_form(
                "/v1/billing_portal/sessions",
                &[
                    ("customer", customer_id),
                    ("return_url", self.urls.return_url.as_str()),
                ],
            )
            .await;

        match result {
            Ok(session) => Ok(Some(session.url)),
            Err(e) => {
                warn!(customer_id = %customer_id, error = %e, "portal session creation failed");
                Ok(None)
            }
        }
    }
}
