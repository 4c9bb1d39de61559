// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completions provider adapter for the Bento bot.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, ContentPart, MessageContent, ResponseFormat, Role,
};
