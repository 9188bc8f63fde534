// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Quill backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Quill configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuillConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// SMS provider settings.
    #[serde(default)]
    pub sms: SmsConfig,

    /// SMTP email settings.
    #[serde(default)]
    pub email: EmailConfig,

    /// Billing provider settings.
    #[serde(default)]
    pub billing: BillingConfig,

    /// AI completion provider settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Free-trial policy settings.
    #[serde(default)]
    pub trial: TrialConfig,

    /// Dialogue flow wiring.
    #[serde(default)]
    pub flows: FlowsConfig,

    /// Invite code to billing price mapping.
    #[serde(default)]
    pub invite: InviteConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional persona instruction prefixed to every completion request
    /// as a system message.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Informational URL returned by the `@about` command.
    #[serde(default = "default_about_url")]
    pub about_url: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            about_url: default_about_url(),
        }
    }
}

fn default_agent_name() -> String {
    "Quill".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_about_url() -> String {
    "https://quill.chat/about".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("quill").join("quill.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("quill.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally-visible base URL of this deployment. Used to rebuild
    /// the exact URL the SMS provider signed, and as the base of the
    /// internal completion callback URL.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Shared bearer secret for the internal completion callback.
    /// `None` rejects all callback requests (fail-closed).
    #[serde(default)]
    pub internal_token: Option<String>,

    /// Validate inbound webhook signatures. Disable only for local
    /// development.
    #[serde(default = "default_validate_signatures")]
    pub validate_signatures: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            internal_token: None,
            validate_signatures: default_validate_signatures(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_validate_signatures() -> bool {
    true
}

/// SMS provider configuration (Twilio-compatible REST API).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    /// Provider account SID. `None` disables outbound SMS.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Provider auth token. Also the signing key for webhook validation.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Sender phone number in E.164 format.
    #[serde(default)]
    pub from_number: Option<String>,

    /// URL of the contact card attached by the `@contact` command.
    #[serde(default = "default_contact_card_url")]
    pub contact_card_url: String,
}

fn default_contact_card_url() -> String {
    "https://quill.chat/vcards/quill.vcf".to_string()
}

/// SMTP email configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// SMTP relay hostname. `None` disables outbound email.
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Operator address support requests are forwarded to.
    #[serde(default = "default_support_to")]
    pub support_to: String,

    /// Sender address for support forwards.
    #[serde(default = "default_support_from")]
    pub support_from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            support_to: default_support_to(),
            support_from: default_support_from(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_support_to() -> String {
    "support@quill.chat".to_string()
}

fn default_support_from() -> String {
    "relay@quill.chat".to_string()
}

/// Billing provider configuration (Stripe-compatible REST API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    /// Provider secret key. `None` disables billing operations.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Redirect target after a successful checkout.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    /// Redirect target after an abandoned checkout.
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,

    /// Return target for customer portal sessions.
    #[serde(default = "default_return_url")]
    pub return_url: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            return_url: default_return_url(),
        }
    }
}

fn default_success_url() -> String {
    "https://quill.chat/billing/confirmation?success=true".to_string()
}

fn default_cancel_url() -> String {
    "https://quill.chat/billing/confirmation?success=false".to_string()
}

fn default_return_url() -> String {
    "https://quill.chat".to_string()
}

/// AI completion provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiConfig {
    /// Provider API key. `None` disables the AI path.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for chat completions.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Free-trial policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrialConfig {
    /// Number of assistant replies a user gets before a subscription is
    /// required.
    #[serde(default = "default_free_messages")]
    pub free_messages: i64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            free_messages: default_free_messages(),
        }
    }
}

fn default_free_messages() -> i64 {
    10
}

/// How the onboarding opt-in flow is wired into the response coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingMode {
    /// Never dispatch to the flow.
    Off,
    /// Dispatch only for users that already have a flow row.
    Engaged,
    /// Dispatch every non-command message to the flow (catch-all).
    Always,
}

/// Dialogue flow wiring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlowsConfig {
    /// Onboarding flow dispatch mode.
    #[serde(default = "default_onboarding_mode")]
    pub onboarding: OnboardingMode,

    /// Persisted id of the onboarding flow.
    #[serde(default = "default_flow_id")]
    pub flow_id: String,

    /// Campaign the onboarding flow subscribes users to.
    #[serde(default = "default_campaign_id")]
    pub campaign_id: String,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            onboarding: default_onboarding_mode(),
            flow_id: default_flow_id(),
            campaign_id: default_campaign_id(),
        }
    }
}

fn default_onboarding_mode() -> OnboardingMode {
    OnboardingMode::Engaged
}

fn default_flow_id() -> String {
    "launch-updates-opt-in".to_string()
}

fn default_campaign_id() -> String {
    "launch-updates".to_string()
}

/// Invite code to billing price mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InviteConfig {
    /// Case-insensitive invite code -> billing price id. Keys are
    /// normalized to lowercase at load time.
    #[serde(default = "default_invite_codes")]
    pub codes: BTreeMap<String, String>,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            codes: default_invite_codes(),
        }
    }
}

fn default_invite_codes() -> BTreeMap<String, String> {
    let mut codes = BTreeMap::new();
    codes.insert("kicsy".to_string(), "price_quill_founding".to_string());
    codes
}
