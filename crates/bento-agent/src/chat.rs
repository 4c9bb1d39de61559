// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-turn conversational responder.
//!
//! One completion call with the fixed persona prompt; the completion text
//! is the reply verbatim. No state is read or written.

use bento_openai::{ChatMessage, ChatRequest};
use tracing::warn;

use crate::ports::CompletionApi;
use crate::prompts::CHAT_SYSTEM_PROMPT;

const CHAT_APOLOGY: &str = "抱歉，我現在無法回應，請稍後再試。";

const EMPTY_COMPLETION_FALLBACK: &str = "抱歉，我無法理解您的訊息。";

/// Produces a conversational reply for free text, or a fixed apology when
/// the completion call fails.
pub async fn respond(
    llm: &dyn CompletionApi,
    model: &str,
    max_tokens: u32,
    user_text: &str,
) -> String {
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::user(user_text),
        ],
        temperature: Some(0.7),
        max_tokens: Some(max_tokens),
        response_format: None,
    };

    match llm.chat(request).await {
        Ok(response) => response
            .first_content()
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_FALLBACK.to_string()),
        Err(e) => {
            warn!(error = %e, "conversational completion failed");
            CHAT_APOLOGY.to_string()
        }
    }
}
