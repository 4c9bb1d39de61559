// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: required secrets, valid environment names, sane windows.

use crate::diagnostic::ConfigError;
use crate::model::BentoConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BentoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Required secrets. Startup must fail without them.
    if config.line.channel_secret.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "line.channel_secret is required".to_string(),
        });
    }

    if config.line.channel_access_token.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "line.channel_access_token is required".to_string(),
        });
    }

    if config.openai.api_key.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "openai.api_key is required".to_string(),
        });
    }

    // Environment must be one of the known deployment names.
    let env = config.bot.environment.as_str();
    if env != "development" && env != "production" {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.environment must be `development` or `production`, got `{env}`"
            ),
        });
    }

    if config.bot.group_trigger.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bot.group_trigger must not be empty".to_string(),
        });
    }

    if config.bot.pending_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "bot.pending_ttl_secs must be positive".to_string(),
        });
    }

    if config.backend.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.base_url must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
