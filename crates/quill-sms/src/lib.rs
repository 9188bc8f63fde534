// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio-compatible SMS transport.
//!
//! Implements [`SmsGateway`] over the provider's Messages REST API
//! (form-encoded POST, basic auth) and the Lookup API for phone
//! validation. Transient errors (429, 5xx) are retried once after a
//! short delay.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use quill_core::{QuillError, SmsGateway};

/// Base URL for the Messages REST API.
const API_BASE_URL: &str = "https://api.twilio.com";
/// Base URL for the Lookup API.
const LOOKUP_BASE_URL: &str = "https://lookups.twilio.com";

/// HTTP client for the SMS provider.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base_url: String,
    lookup_base_url: String,
}

/// Subset of the provider's message-creation response.
#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

/// Subset of the provider's lookup response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    valid: bool,
    phone_number: Option<String>,
}

impl TwilioClient {
    /// Creates a new SMS client.
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
    ) -> Result<Self, QuillError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| QuillError::Sms {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            account_sid,
            auth_token,
            from_number,
            api_base_url: API_BASE_URL.to_string(),
            lookup_base_url: LOOKUP_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URLs (for testing with wiremock).
    #[cfg(test)]
    fn with_base_urls(mut self, api: String, lookup: String) -> Self {
        self.api_base_url = api;
        self.lookup_base_url = lookup;
        self
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl SmsGateway for TwilioClient {
    async fn send(
        &self,
        to: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<String, QuillError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base_url, self.account_sid
        );

        let mut form = vec![
            ("From", self.from_number.as_str()),
            ("To", to),
            ("Body", body),
        ];
        if let Some(media_url) = media_url {
            form.push(("MediaUrl", media_url));
        }

        let mut last_error = None;

        for attempt in 0..=1u32 {
            if attempt > 0 {
                warn!(attempt, "retrying SMS send after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .basic_auth(&self.account_sid, Some(&self.auth_token))
                .form(&form)
                .send()
                .await
                .map_err(|e| QuillError::Sms {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, to = %to, "SMS send response received");

            if status.is_success() {
                let parsed: MessageResponse =
                    response.json().await.map_err(|e| QuillError::Sms {
                        message: format!("failed to parse send response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(parsed.sid);
            }

            let body_text = response.text().await.unwrap_or_default();
            let error = QuillError::Sms {
                message: format!("message creation failed with {status}: {body_text}"),
                source: None,
            };
            if is_transient_error(status) && attempt == 0 {
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| QuillError::Sms {
            message: "SMS send failed after retries".to_string(),
            source: None,
        }))
    }

    async fn validate(&self, number: &str) -> Result<String, QuillError> {
        let url = format!("{}/v2/PhoneNumbers/{}", self.lookup_base_url, number);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| QuillError::Sms {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QuillError::Sms {
                message: format!("lookup failed with {status}: {body_text}"),
                source: None,
            });
        }

        let parsed: LookupResponse = response.json().await.map_err(|e| QuillError::Sms {
            message: format!("failed to parse lookup response: {e}"),
            source: Some(Box::new(e)),
        })?;

        if parsed.valid {
            Ok(parsed.phone_number.unwrap_or_else(|| number.to_string()))
        } else {
            Err(QuillError::Sms {
                message: format!("validation failed on `{number}` via the lookup API"),
                source: None,
            })
        }
    }
}
