// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Bento workspace.

use serde::{Deserialize, Serialize};

/// LINE user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// LINE group or room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

/// Identifier of a single platform message, used to fetch binary content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Single-use reply handle issued by the platform for one inbound event.
///
/// Must be consumed at most once; the platform expires it quickly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyToken(pub String);

/// Where an inbound event originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// One-on-one chat with the bot.
    Direct { user_id: UserId },
    /// Group or multi-person room chat.
    Group { group_id: GroupId, user_id: UserId },
}

impl EventSource {
    /// The sending user, regardless of chat kind.
    pub fn user_id(&self) -> &UserId {
        match self {
            EventSource::Direct { user_id } => user_id,
            EventSource::Group { user_id, .. } => user_id,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, EventSource::Direct { .. })
    }
}

/// Payload of a normalized inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// An image message; the binary content is fetched separately by id.
    ImageMessage { message_id: MessageId },
    /// A plain text message.
    TextMessage { text: String },
    /// One or more members joined a group the bot is in.
    MemberJoined { joined: Vec<UserId> },
    /// A user added the bot as a friend.
    Follow,
}

/// One normalized webhook event, immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub reply_token: ReplyToken,
    pub source: EventSource,
}

/// Structured nutrition result produced by the vision analyzer.
///
/// All macro fields are grams except `calories` (kcal). The model reports
/// zeros when the image is not food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysis {
    /// Narrative analysis text shown to the user.
    pub text: String,
    pub carbohydrates: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
}

/// A food analysis awaiting the user's save/discard decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAnalysis {
    pub analysis: FoodAnalysis,
    /// Original image, base64-encoded for transport to the backend.
    pub image_base64: String,
}
