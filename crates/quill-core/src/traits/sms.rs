// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS transport trait for outbound text message delivery.

use async_trait::async_trait;

use crate::error::QuillError;

/// Outbound SMS transport.
///
/// Implementations wrap a provider REST API (Twilio-style). The webhook
/// reply path does not go through this trait; it is used for out-of-band
/// sends (media attachments, welcome messages, async completion delivery).
#[async_trait]
pub trait SmsGateway: Send + Sync + 'static {
    /// Sends a text message, optionally with a media attachment URL.
    ///
    /// Returns the provider's message id.
    async fn send(
        &self,
        to: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<String, QuillError>;

    /// Validates a phone number against the provider's lookup service.
    ///
    /// Returns the number on success, an [`QuillError::Sms`] on rejection.
    async fn validate(&self, number: &str) -> Result<String, QuillError>;
}
