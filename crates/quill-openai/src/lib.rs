// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat-completion worker.
//!
//! Implements [`CompletionGateway`]: `submit` detaches a background task
//! that calls the chat completions API and then POSTs the generated text
//! back to the gateway's internal callback route with the shared bearer
//! secret. The caller never waits on generation; failures are logged and
//! the provider-side retry/backstop applies.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

use quill_core::types::CompletionJob;
use quill_core::{CompletionGateway, QuillError};

/// Base URL for the chat completions API.
const API_BASE_URL: &str = "https://api.openai.com";

/// HTTP client for the completion provider plus callback delivery.
#[derive(Debug, Clone)]
pub struct OpenAiCompletions {
    client: reqwest::Client,
    model: String,
    /// Internal completion-callback URL on our own gateway.
    callback_url: String,
    /// Shared bearer secret the gateway expects on the callback.
    callback_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: i64,
}

impl OpenAiCompletions {
    /// Creates a new completion worker.
    pub fn new(
        api_key: String,
        model: String,
        callback_url: String,
        callback_token: String,
    ) -> Result<Self, QuillError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "authorization",
            reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(
                |e| QuillError::Config(format!("invalid API key header value: {e}")),
            )?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| QuillError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            callback_url,
            callback_token,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Runs one job to completion: generate, then deliver the callback.
    ///
    /// Public so the serve wiring and tests can run jobs inline; `submit`
    /// wraps this in a detached task.
    pub async fn process(&self, job: CompletionJob) -> Result<(), QuillError> {
        let (message, tokens) = self.generate(&job).await?;

        let callback_body = serde_json::json!({
            "submission_id": job.submission_id,
            "user_id": job.user_id,
            "message_id": job.message_id,
            "number": job.recipient,
            "message": message,
            "tokens": tokens,
        });

        let response = self
            .client
            .post(&self.callback_url)
            .header("authorization", format!("Bearer {}", self.callback_token))
            .json(&callback_body)
            .send()
            .await
            .map_err(|e| QuillError::Provider {
                message: format!("callback delivery failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuillError::Provider {
                message: format!("callback rejected with {status}: {body}"),
                source: None,
            });
        }

        debug!(
            submission_id = %job.submission_id,
            tokens = tokens,
            "completion generated and delivered"
        );
        Ok(())
    }

    /// Calls the completions API, retrying once on transient errors.
    async fn generate(&self, job: &CompletionJob) -> Result<(String, i64), QuillError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request_body = serde_json::json!({
            "model": self.model,
            "messages": job.messages,
        });

        let mut last_error = None;

        for attempt in 0..=1u32 {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request_body)
                .send()
                .await
                .map_err(|e| QuillError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let parsed: ChatCompletionResponse =
                    response.json().await.map_err(|e| QuillError::Provider {
                        message: format!("failed to parse completion response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                let message = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| QuillError::Provider {
                        message: "completion response contained no content".to_string(),
                        source: None,
                    })?;
                let tokens = parsed.usage.map(|u| u.total_tokens).unwrap_or(0);
                return Ok((message, tokens));
            }

            let body = response.text().await.unwrap_or_default();
            let error = QuillError::Provider {
                message: format!("completion API returned {status}: {body}"),
                source: None,
            };
            if matches!(status.as_u16(), 429 | 500 | 503) && attempt == 0 {
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| QuillError::Provider {
            message: "completion request failed after retries".to_string(),
            source: None,
        }))
    }
}

#[async_trait]
impl CompletionGateway for OpenAiCompletions {
    async fn submit(&self, job: CompletionJob) -> Result<(), QuillError> {
        let worker = self.clone();
        let submission_id = job.submission_id.clone();
        tokio::spawn(async move {
            if let Err(e) = worker.process(job).await {
                error!(submission_id = %submission_id, error = %e, "completion job failed");
            }
        });
        Ok(())
    }
}
