// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway trait definitions for Quill's external collaborators.
//!
//! Every outbound capability (SMS, email, billing, AI completion) and the
//! persistence layer is expressed as a narrow trait using `#[async_trait]`
//! for dynamic dispatch, so components receive injected capabilities
//! rather than reaching for process-wide singletons.

pub mod billing;
pub mod email;
pub mod provider;
pub mod sms;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use billing::BillingGateway;
pub use email::EmailGateway;
pub use provider::CompletionGateway;
pub use sms::SmsGateway;
pub use store::Store;
