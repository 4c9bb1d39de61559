// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Bento bot.

use thiserror::Error;

/// The primary error type used across all Bento crates.
#[derive(Debug, Error)]
pub enum BentoError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Webhook request signature verification failed or was impossible.
    #[error("signature verification failed")]
    Signature,

    /// Malformed structured output from the language model.
    #[error("parse error: {0}")]
    Parse(String),

    /// Messaging platform API errors (reply, push, profile, content fetch).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        /// HTTP status returned by the platform, when one was received.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider errors (API failure, invalid response shape).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote persistence backend errors (user/food CRUD).
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed inbound event; the event is dropped without a reply.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BentoError {
    /// True when the error is a platform "not found" response, used to
    /// distinguish a non-contact profile lookup from a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BentoError::Platform {
                status: Some(404),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection() {
        let err = BentoError::Platform {
            message: "profile lookup failed".into(),
            status: Some(404),
            source: None,
        };
        assert!(err.is_not_found());

        let err = BentoError::Platform {
            message: "rate limited".into(),
            status: Some(429),
            source: None,
        };
        assert!(!err.is_not_found());

        assert!(!BentoError::Signature.is_not_found());
    }

    #[test]
    fn display_carries_message() {
        let err = BentoError::Persistence {
            message: "POST /foods/ returned 500".into(),
            source: None,
        };
        assert!(err.to_string().contains("POST /foods/"));
    }
}
