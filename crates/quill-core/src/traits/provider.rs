// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI completion gateway trait.

use async_trait::async_trait;

use crate::error::QuillError;
use crate::types::CompletionJob;

/// Asynchronous AI completion dispatch.
///
/// `submit` is fire-and-forget from the caller's perspective: it returns
/// as soon as the job is handed off, never waiting on generation. The
/// generated reply arrives later through the gateway's internal
/// completion callback, correlated by the job's submission id.
#[async_trait]
pub trait CompletionGateway: Send + Sync + 'static {
    /// Dispatches a completion job for background processing.
    async fn submit(&self, job: CompletionJob) -> Result<(), QuillError>;
}
