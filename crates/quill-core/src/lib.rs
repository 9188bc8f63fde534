// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Quill SMS assistant backend.
//!
//! This crate provides the foundational gateway trait definitions, error
//! types, and domain types used throughout the Quill workspace. All
//! external collaborators (SMS, email, billing, AI completion, storage)
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QuillError;
pub use types::{MessageId, MessageRole, OptInStep, UserId};

// Re-export all gateway traits at crate root.
pub use traits::{BillingGateway, CompletionGateway, EmailGateway, SmsGateway, Store};
