// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod leaderboard;
pub mod password;
pub mod seed;

pub use leaderboard::{build_leaderboard, LeaderboardError, LeaderboardService};
pub use seed::{generate_dataset, generate_sample_dataset, populate, SeedDataset, SeedReport};
