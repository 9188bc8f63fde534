// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./quill.toml` > `~/.config/quill/quill.toml` > `/etc/quill/quill.toml`
//! with environment variable overrides via `QUILL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::QuillConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/quill/quill.toml` (system-wide)
/// 3. `~/.config/quill/quill.toml` (user XDG config)
/// 4. `./quill.toml` (local directory)
/// 5. `QUILL_*` environment variables
pub fn load_config() -> Result<QuillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuillConfig::default()))
        .merge(Toml::file("/etc/quill/quill.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("quill/quill.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("quill.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<QuillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuillConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuillConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `QUILL_SMS_AUTH_TOKEN` must
/// map to `sms.auth_token`, not `sms.auth.token`.
fn env_provider() -> Env {
    Env::prefixed("QUILL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: QUILL_SMS_AUTH_TOKEN -> "sms_auth_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("sms_", "sms.", 1)
            .replacen("email_", "email.", 1)
            .replacen("billing_", "billing.", 1)
            .replacen("ai_", "ai.", 1)
            .replacen("trial_", "trial.", 1)
            .replacen("flows_", "flows.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OnboardingMode;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "Quill");
        assert_eq!(config.trial.free_messages, 10);
        assert_eq!(config.flows.onboarding, OnboardingMode::Engaged);
        assert_eq!(
            config.invite.codes.get("kicsy").map(String::as_str),
            Some("price_quill_founding")
        );
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[trial]
free_messages = 3

[flows]
onboarding = "always"

[invite]
codes = { beta = "price_beta_monthly" }
"#,
        )
        .unwrap();
        assert_eq!(config.trial.free_messages, 3);
        assert_eq!(config.flows.onboarding, OnboardingMode::Always);
        assert_eq!(
            config.invite.codes.get("beta").map(String::as_str),
            Some("price_beta_monthly")
        );
        // Figment merges dictionaries recursively, so the default codes
        // survive alongside the configured ones.
        assert!(config.invite.codes.contains_key("kicsy"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[agent]
naem = "typo"
"#,
        );
        assert!(result.is_err());
    }
}
