// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, sane thresholds, and coherent
//! signature-validation settings.

use crate::diagnostic::ConfigError;
use crate::model::QuillConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &QuillConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.port must be non-zero".to_string(),
        });
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of trace, debug, info, warn, error; got `{}`",
                config.agent.log_level
            ),
        });
    }

    if config.trial.free_messages < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "trial.free_messages must be non-negative, got {}",
                config.trial.free_messages
            ),
        });
    }

    // Signature validation is meaningless without the signing key.
    if config.gateway.validate_signatures && config.sms.auth_token.is_none() {
        errors.push(ConfigError::Validation {
            message: "gateway.validate_signatures requires sms.auth_token to be set"
                .to_string(),
        });
    }

    if config.flows.flow_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "flows.flow_id must not be empty".to_string(),
        });
    }

    if config.flows.campaign_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "flows.campaign_id must not be empty".to_string(),
        });
    }

    for code in config.invite.codes.keys() {
        if code.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "invite.codes must not contain empty codes".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> QuillConfig {
        let mut config = QuillConfig::default();
        config.sms.auth_token = Some("token".into());
        config
    }

    #[test]
    fn default_config_with_auth_token_validates() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn default_config_without_auth_token_fails() {
        // validate_signatures defaults on; without a signing key that is
        // a misconfiguration, not a silent bypass.
        let config = QuillConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("auth_token"))));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = valid_config();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn negative_trial_fails_validation() {
        let mut config = valid_config();
        config.trial.free_messages = -1;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("free_messages"))));
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = valid_config();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn zero_trial_is_allowed() {
        let mut config = valid_config();
        config.trial.free_messages = 0;
        assert!(validate_config(&config).is_ok());
    }
}
