// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion gateway recording submitted jobs.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quill_core::types::CompletionJob;
use quill_core::{CompletionGateway, QuillError};

/// A completion gateway that records jobs instead of dispatching them.
#[derive(Clone, Default)]
pub struct MockCompletion {
    jobs: Arc<Mutex<Vec<CompletionJob>>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every job submitted so far.
    pub async fn jobs(&self) -> Vec<CompletionJob> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl CompletionGateway for MockCompletion {
    async fn submit(&self, job: CompletionJob) -> Result<(), QuillError> {
        self.jobs.lock().await.push(job);
        Ok(())
    }
}
