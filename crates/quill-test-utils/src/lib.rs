// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock gateway implementations for fast, CI-runnable tests without
//! external services.

pub mod mock_billing;
pub mod mock_completion;
pub mod mock_email;
pub mod mock_sms;

pub use mock_billing::MockBilling;
pub use mock_completion::MockCompletion;
pub use mock_email::{MockEmail, SentEmail};
pub use mock_sms::{MockSms, SentSms};
