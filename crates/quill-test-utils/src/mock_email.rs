// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock email gateway for deterministic testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quill_core::{EmailGateway, QuillError};

/// A single recorded outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// An email gateway that records sends instead of delivering them.
#[derive(Clone, Default)]
pub struct MockEmail {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl MockEmail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `send` calls fail with an email error.
    pub async fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().await = fail;
    }

    /// Returns everything sent so far.
    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl EmailGateway for MockEmail {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), QuillError> {
        if *self.fail_sends.lock().await {
            return Err(QuillError::Email {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push(SentEmail {
            from: from.to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends() {
        let email = MockEmail::new();
        email
            .send("Quill <relay@quill.chat>", "ops@quill.chat", "Help", "hi")
            .await
            .unwrap();
        let sent = email.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Help");
    }
}
