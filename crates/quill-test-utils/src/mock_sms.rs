// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS gateway for deterministic testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quill_core::{QuillError, SmsGateway};

/// A single recorded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
    pub media_url: Option<String>,
}

/// An SMS gateway that records sends instead of delivering them.
#[derive(Clone, Default)]
pub struct MockSms {
    sent: Arc<Mutex<Vec<SentSms>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl MockSms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `send` calls fail with an SMS error.
    pub async fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().await = fail;
    }

    /// Returns everything sent so far.
    pub async fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl SmsGateway for MockSms {
    async fn send(
        &self,
        to: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<String, QuillError> {
        if *self.fail_sends.lock().await {
            return Err(QuillError::Sms {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        let mut sent = self.sent.lock().await;
        sent.push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
            media_url: media_url.map(str::to_string),
        });
        Ok(format!("SM-mock-{}", sent.len()))
    }

    async fn validate(&self, number: &str) -> Result<String, QuillError> {
        Ok(number.to_string())
    }
}
