// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `quill-core::types` for use across
//! gateway trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use quill_core::types::{
    Campaign, CampaignMember, FlowRecord, MessageRecord, Submission, UsageMetric, User,
};
