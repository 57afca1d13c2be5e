// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod leaderboard;
pub mod team;
pub mod user;
pub mod workout;

pub use activity::{Activity, CreateActivityRequest};
pub use leaderboard::{LeaderboardEntry, LeaderboardEntryView, LeaderboardSnapshot};
pub use team::{CreateTeamRequest, Team, TeamResponse, UpdateTeamRequest};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserResponse};
pub use workout::{CreateWorkoutRequest, Difficulty, Workout};
