// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Quill backend.
//!
//! Exposes the SMS provider webhook (form-decoded, signature-validated,
//! TwiML-answered), the bearer-authenticated internal completion
//! callback, and an unauthenticated health endpoint.

pub mod auth;
pub mod handlers;
pub mod params;
pub mod server;
pub mod twiml;

pub use auth::AuthConfig;
pub use params::InboundSms;
pub use server::{router, start_server, GatewayState, HealthState, ServerConfig, SignatureConfig};
