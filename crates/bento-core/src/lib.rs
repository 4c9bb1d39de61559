// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Bento bot.
//!
//! Provides the shared error type, the normalized event model, and the
//! pending-analysis session store used throughout the Bento workspace.

pub mod error;
pub mod session;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BentoError;
pub use session::{MemorySessionStore, SessionStore, DEFAULT_PENDING_TTL};
pub use types::{
    EventKind, EventSource, FoodAnalysis, GroupId, InboundEvent, MessageId, PendingAnalysis,
    ReplyToken, UserId,
};
