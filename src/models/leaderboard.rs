// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Leaderboard snapshot models.
//!
//! A leaderboard is never edited entry by entry. Each rebuild produces a
//! complete [`LeaderboardSnapshot`] which replaces the stored one wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Per-user aggregate at the time the snapshot was built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    /// The user's team when the snapshot was built
    pub team_id: Option<Uuid>,
    pub total_calories: u64,
    pub total_activities: u64,
    /// Minutes
    pub total_duration: u64,
    /// 1 = most calories
    pub rank: u32,
    pub updated_at: DateTime<Utc>,
}

/// The stored leaderboard: entries ordered by ascending rank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardSnapshot {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardSnapshot {
    /// Snapshot with no entries, used before the first build.
    pub fn empty() -> Self {
        Self {
            generated_at: DateTime::<Utc>::UNIX_EPOCH,
            entries: Vec::new(),
        }
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

/// Leaderboard row as served by the API, with display names resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct LeaderboardEntryView {
    pub user_id: Uuid,
    /// User name, or "Unknown User" if the user no longer exists
    pub user: String,
    pub team_id: Option<Uuid>,
    /// Team name, if the team still exists
    pub team: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_calories: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_activities: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_duration: u64,
    pub rank: u32,
    pub updated_at: DateTime<Utc>,
}

/// Name shown for entries whose user has since been deleted.
pub const UNKNOWN_USER: &str = "Unknown User";
