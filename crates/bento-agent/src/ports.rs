// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter seams over the external collaborators.
//!
//! The dispatcher talks to the messaging platform, the LLM provider, and
//! the persistence backend exclusively through these traits, so tests can
//! substitute recording fakes (see [`crate::testing`]).

use async_trait::async_trait;
use bento_backend::{BackendClient, BackendUser, NewFoodRecord, NewUser};
use bento_core::types::{MessageId, ReplyToken, UserId};
use bento_core::BentoError;
use bento_line::client::Profile;
use bento_line::{LineClient, OutboundMessage};
use bento_openai::{ChatRequest, ChatResponse, OpenAiClient};

/// The narrow messaging-platform surface this bot consumes.
#[async_trait]
pub trait LineApi: Send + Sync {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), BentoError>;

    async fn push(&self, to: &str, messages: Vec<OutboundMessage>) -> Result<(), BentoError>;

    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, BentoError>;

    async fn get_message_content(&self, message_id: &MessageId) -> Result<Vec<u8>, BentoError>;
}

#[async_trait]
impl LineApi for LineClient {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), BentoError> {
        self.reply_message(reply_token, &messages).await
    }

    async fn push(&self, to: &str, messages: Vec<OutboundMessage>) -> Result<(), BentoError> {
        self.push_message(to, &messages).await
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, BentoError> {
        LineClient::get_profile(self, user_id).await
    }

    async fn get_message_content(&self, message_id: &MessageId) -> Result<Vec<u8>, BentoError> {
        LineClient::get_message_content(self, message_id).await
    }
}

/// Single-call LLM completion surface.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BentoError>;
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BentoError> {
        self.chat_completion(&request).await
    }
}

/// The persistence backend's CRUD surface.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn find_user_by_line_id(
        &self,
        line_user_id: &str,
    ) -> Result<Option<BackendUser>, BentoError>;

    async fn create_user(&self, user: &NewUser) -> Result<BackendUser, BentoError>;

    async fn create_food_record(&self, record: &NewFoodRecord) -> Result<(), BentoError>;
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn find_user_by_line_id(
        &self,
        line_user_id: &str,
    ) -> Result<Option<BackendUser>, BentoError> {
        BackendClient::find_user_by_line_id(self, line_user_id).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<BackendUser, BentoError> {
        BackendClient::create_user(self, user).await
    }

    async fn create_food_record(&self, record: &NewFoodRecord) -> Result<(), BentoError> {
        BackendClient::create_food_record(self, record).await
    }
}
