// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration core for the Bento bot.
//!
//! Receives normalized webhook events and decides, for each one, what to
//! ask the LLM, what per-user state to keep, and what to send back:
//! the dispatcher state machine, the food vision analyzer, the
//! conversational responder, and the travel tool-use loop.

pub mod chat;
pub mod dispatch;
pub mod handlers;
pub mod ports;
pub mod prompts;
pub mod testing;
pub mod travel;
pub mod vision;

pub use dispatch::{AgentSettings, Dispatcher, CONFIRM_PHRASE, REJECT_PHRASE};
pub use ports::{BackendApi, CompletionApi, LineApi};
pub use vision::{classify_analysis, FoodClassification};
