// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE Messaging API adapter for the Bento bot.
//!
//! Covers the narrow platform surface this bot consumes: webhook signature
//! verification, envelope parsing and event normalization, outbound message
//! construction, and the HTTP client for reply/push/profile/content calls.

pub mod client;
pub mod events;
pub mod messages;
pub mod signature;

pub use client::{LineClient, Profile};
pub use events::{normalize, WebhookEnvelope};
pub use messages::OutboundMessage;
