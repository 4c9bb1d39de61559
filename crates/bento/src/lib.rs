// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server wiring for the Bento bot binary.
//!
//! Exposed as a library so integration tests can drive the webhook router
//! directly.

pub mod serve;
pub mod webhook;
