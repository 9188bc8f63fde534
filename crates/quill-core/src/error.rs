// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Quill SMS assistant backend.

use thiserror::Error;

/// The primary error type used across all Quill gateway traits and core operations.
#[derive(Debug, Error)]
pub enum QuillError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A write violated a uniqueness constraint (duplicate phone or email).
    ///
    /// Recovered locally where the flow engine can script a reply for it;
    /// fatal everywhere else.
    #[error("conflict on unique field: {field}")]
    Conflict { field: String },

    /// A precondition for the current request does not hold (inactive
    /// campaign, update against a nonexistent record). Fatal to the request.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// SMS transport errors (send failure, lookup rejection).
    #[error("sms error: {message}")]
    Sms {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Email transport errors (SMTP delivery failure).
    #[error("email error: {message}")]
    Email {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Billing gateway errors (customer creation, checkout/portal session failure).
    #[error("billing error: {message}")]
    Billing {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// AI completion provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
