// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Bento bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Bento configuration.
///
/// Loaded from TOML files, with environment variable overrides. All sections
/// are optional and default to sensible values; the LINE and OpenAI secrets
/// have no defaults and are validated as required at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BentoConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,

    /// OpenAI API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Remote persistence backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Bot behavior settings.
    #[serde(default)]
    pub bot: BotConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// LINE Messaging API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures. Required.
    #[serde(default)]
    pub channel_secret: String,

    /// Channel access token for outbound API calls. Required.
    #[serde(default)]
    pub channel_access_token: String,

    /// Base URL of the Messaging API.
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_access_token: String::new(),
            api_base: default_line_api_base(),
        }
    }
}

fn default_line_api_base() -> String {
    "https://api.line.me/v2/bot".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Required.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the API.
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model for free-text conversation.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model for food-photo vision analysis.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Model for the travel tool-use loop.
    #[serde(default = "default_travel_model")]
    pub travel_model: String,

    /// Completion token cap applied to every call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_openai_api_base(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            travel_model: default_travel_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_travel_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

/// Remote user/food persistence backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend CRUD API.
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
        }
    }
}

fn default_backend_base_url() -> String {
    "https://lipo-out-backend-production.up.railway.app".to_string()
}

/// Bot behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Deployment environment name (development, production).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Substring that must appear (case-insensitively) in a group message
    /// before the bot responds.
    #[serde(default = "default_group_trigger")]
    pub group_trigger: String,

    /// Lifetime of an unconfirmed food analysis, in seconds.
    #[serde(default = "default_pending_ttl_secs")]
    pub pending_ttl_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            group_trigger: default_group_trigger(),
            pending_ttl_secs: default_pending_ttl_secs(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_group_trigger() -> String {
    "bento".to_string()
}

fn default_pending_ttl_secs() -> u64 {
    600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BentoConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bot.environment, "development");
        assert_eq!(config.openai.max_tokens, 512);
        assert!(config.line.channel_secret.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [server]
            prot = 8080
        "#;
        let result: Result<BentoConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
