// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the LINE Messaging API.
//!
//! Provides [`LineClient`] covering the four platform operations this bot
//! consumes: reply, push, profile lookup, and message content download.

use std::time::Duration;

use bento_core::types::{MessageId, ReplyToken, UserId};
use bento_core::BentoError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::messages::OutboundMessage;

/// Base URL for the Messaging API.
const API_BASE_URL: &str = "https://api.line.me/v2/bot";

/// A user's public display profile.
///
/// Lookup fails with a 404 for users who have not added the bot as a friend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody<'a> {
    reply_token: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Serialize)]
struct PushBody<'a> {
    to: &'a str,
    messages: &'a [OutboundMessage],
}

/// HTTP client for LINE platform communication.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    base_url: String,
}

impl LineClient {
    /// Creates a new Messaging API client authenticated with the channel
    /// access token.
    pub fn new(channel_access_token: &str) -> Result<Self, BentoError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {channel_access_token}");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&bearer)
                .map_err(|e| BentoError::Config(format!("invalid channel access token: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BentoError::Platform {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (configuration and wiremock tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sends reply messages against a single-use reply token.
    pub async fn reply_message(
        &self,
        reply_token: &ReplyToken,
        messages: &[OutboundMessage],
    ) -> Result<(), BentoError> {
        let body = ReplyBody {
            reply_token: &reply_token.0,
            messages,
        };
        let response = self
            .client
            .post(format!("{}/message/reply", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        check_status("reply", response).await.map(|_| ())
    }

    /// Pushes messages to a user or group outside a reply window.
    pub async fn push_message(
        &self,
        to: &str,
        messages: &[OutboundMessage],
    ) -> Result<(), BentoError> {
        let body = PushBody { to, messages };
        let response = self
            .client
            .post(format!("{}/message/push", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        check_status("push", response).await.map(|_| ())
    }

    /// Fetches a user's display profile.
    pub async fn get_profile(&self, user_id: &UserId) -> Result<Profile, BentoError> {
        let response = self
            .client
            .get(format!("{}/profile/{}", self.base_url, user_id.0))
            .send()
            .await
            .map_err(request_error)?;
        let response = check_status("profile", response).await?;
        response.json().await.map_err(|e| BentoError::Platform {
            message: format!("failed to decode profile response: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })
    }

    /// Downloads the binary content of a message (image bytes).
    pub async fn get_message_content(
        &self,
        message_id: &MessageId,
    ) -> Result<Vec<u8>, BentoError> {
        let response = self
            .client
            .get(format!("{}/message/{}/content", self.base_url, message_id.0))
            .send()
            .await
            .map_err(request_error)?;
        let response = check_status("content", response).await?;
        let bytes = response.bytes().await.map_err(|e| BentoError::Platform {
            message: format!("failed to read message content: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })?;
        debug!(size = bytes.len(), "message content downloaded");
        Ok(bytes.to_vec())
    }
}

fn request_error(e: reqwest::Error) -> BentoError {
    BentoError::Platform {
        message: format!("HTTP request failed: {e}"),
        status: None,
        source: Some(Box::new(e)),
    }
}

async fn check_status(
    operation: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, BentoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BentoError::Platform {
        message: format!("{operation} returned {status}: {body}"),
        status: Some(status.as_u16()),
        source: None,
    })
}
