// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote user/food persistence client for the Bento bot.

pub mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{BackendUser, NewFoodRecord, NewUser};
