// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bento.toml` > `~/.config/bento/bento.toml` >
//! `/etc/bento/bento.toml` with environment variable overrides via `BENTO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BentoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bento/bento.toml` (system-wide)
/// 3. `~/.config/bento/bento.toml` (user XDG config)
/// 4. `./bento.toml` (local directory)
/// 5. `BENTO_*` environment variables
pub fn load_config() -> Result<BentoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BentoConfig::default()))
        .merge(Toml::file("/etc/bento/bento.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("bento/bento.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("bento.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BentoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BentoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BentoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BentoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `BENTO_LINE_CHANNEL_SECRET`
/// must map to `line.channel_secret`, not `line.channel.secret`.
fn env_provider() -> Env {
    Env::prefixed("BENTO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BENTO_LINE_CHANNEL_SECRET -> "line_channel_secret"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("line_", "line.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("backend_", "backend.", 1)
            .replacen("bot_", "bot.", 1);
        mapped.into()
    })
}
