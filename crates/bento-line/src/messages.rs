// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message construction.
//!
//! Builds the platform-specific reply payloads: plain text, text with a
//! quick-reply affordance, and mention-substituted text. Reply bodies are
//! always a list of message objects, even for a single message.

use std::collections::HashMap;

use bento_core::types::UserId;
use serde::Serialize;

/// One outbound message object, serialized in the platform's wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "text")]
    Text {
        text: String,
        #[serde(rename = "quickReply", skip_serializing_if = "Option::is_none")]
        quick_reply: Option<QuickReply>,
    },
    #[serde(rename = "textV2")]
    TextV2 {
        text: String,
        substitution: HashMap<String, Substitution>,
    },
}

/// Quick-reply container attached to a text message.
#[derive(Debug, Clone, Serialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickReplyItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: MessageAction,
}

/// A quick-reply button that sends a literal message when tapped.
#[derive(Debug, Clone, Serialize)]
pub struct MessageAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: String,
    pub text: String,
}

/// A `textV2` placeholder substitution.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Substitution {
    #[serde(rename = "mention")]
    Mention { mentionee: Mentionee },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Mentionee {
    #[serde(rename = "user")]
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

impl OutboundMessage {
    /// A plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text {
            text: text.into(),
            quick_reply: None,
        }
    }

    /// A text message with quick-reply buttons. Each `(label, send_text)`
    /// pair becomes one button that sends its literal text when tapped.
    pub fn text_with_quick_replies(
        text: impl Into<String>,
        buttons: &[(&str, &str)],
    ) -> Self {
        let items = buttons
            .iter()
            .map(|(label, send_text)| QuickReplyItem {
                kind: "action",
                action: MessageAction {
                    kind: "message",
                    label: (*label).to_string(),
                    text: (*send_text).to_string(),
                },
            })
            .collect();
        OutboundMessage::Text {
            text: text.into(),
            quick_reply: Some(QuickReply { items }),
        }
    }

    /// A text message that @-mentions the given user via the platform's
    /// `{user}` placeholder syntax.
    pub fn mention(user_id: &UserId, text: impl AsRef<str>) -> Self {
        let mut substitution = HashMap::new();
        substitution.insert(
            "user".to_string(),
            Substitution::Mention {
                mentionee: Mentionee::User {
                    user_id: user_id.0.clone(),
                },
            },
        );
        OutboundMessage::TextV2 {
            text: format!("{{user}} {}", text.as_ref()),
            substitution,
        }
    }
}
