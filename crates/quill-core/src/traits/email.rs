// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email transport trait for operator-facing notifications.

use async_trait::async_trait;

use crate::error::QuillError;

/// Outbound email transport.
///
/// Used by the `@support` command to forward user requests to the
/// operator contact. Delivery failure is non-fatal to the sender-facing
/// flow; callers log and continue.
#[async_trait]
pub trait EmailGateway: Send + Sync + 'static {
    /// Sends a plaintext email.
    ///
    /// `from` is a full sender identity (`Name <email>`).
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), QuillError>;
}
