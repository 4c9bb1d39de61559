// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user pending-analysis session store.
//!
//! Holds at most one unconfirmed food analysis per user. Entries live in
//! process memory only; a multi-instance deployment must swap in an external
//! shared store behind the same trait.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::types::{PendingAnalysis, UserId};

/// Default lifetime of a pending analysis before it is treated as absent.
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(600);

/// Keyed store for pending food analyses.
pub trait SessionStore: Send + Sync {
    /// Stores a pending analysis, unconditionally replacing any existing
    /// entry for the user. Starting a new analysis cancels an unconfirmed
    /// prior one.
    fn put(&self, user_id: &UserId, pending: PendingAnalysis);

    /// Atomically reads and removes the user's entry. Returns `None` when
    /// no live entry exists.
    fn take(&self, user_id: &UserId) -> Option<PendingAnalysis>;
}

struct Entry {
    pending: PendingAnalysis,
    created_at: Instant,
}

/// In-memory [`SessionStore`] over a concurrent map.
///
/// Entries expire lazily: `take` discards anything older than the configured
/// window and reports absent. Safe for concurrent per-key access from a
/// multi-threaded runtime.
pub struct MemorySessionStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_TTL)
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, user_id: &UserId, pending: PendingAnalysis) {
        self.entries.insert(
            user_id.0.clone(),
            Entry {
                pending,
                created_at: Instant::now(),
            },
        );
    }

    fn take(&self, user_id: &UserId) -> Option<PendingAnalysis> {
        let (_, entry) = self.entries.remove(&user_id.0)?;
        if entry.created_at.elapsed() > self.ttl {
            debug!(user_id = %user_id.0, "pending analysis expired, treating as absent");
            return None;
        }
        Some(entry.pending)
    }
}
