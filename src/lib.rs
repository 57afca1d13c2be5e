// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OctoFit Tracker: team fitness tracking with a calorie leaderboard
//!
//! This crate provides the backend API for users, teams, logged
//! activities and the workout catalog, plus the leaderboard builder that
//! ranks users by total calories burned.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;

use config::Config;
use db::Database;
use services::LeaderboardService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub leaderboard: LeaderboardService,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn Database>) -> Self {
        let leaderboard = LeaderboardService::new(db.clone());
        Self {
            config,
            db,
            leaderboard,
        }
    }
}
