// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard routes.
//!
//! Reads serve the stored snapshot as-is; only the refresh endpoint
//! rebuilds it.

use crate::error::Result;
use crate::models::leaderboard::UNKNOWN_USER;
use crate::models::{LeaderboardEntry, LeaderboardEntryView, Team, User};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

/// Rebuild trigger (admin key required; applied in routes/mod.rs).
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/leaderboard/refresh", post(refresh_leaderboard))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    /// Only entries whose snapshot team matches
    team_id: Option<Uuid>,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntryView>>> {
    let snapshot = state.leaderboard.current().await?;
    let entries: Vec<LeaderboardEntry> = snapshot
        .entries
        .into_iter()
        .filter(|e| params.team_id.is_none_or(|t| e.team_id == Some(t)))
        .collect();

    let views = enrich(
        &entries,
        &state.db.list_users().await?,
        &state.db.list_teams().await?,
    );
    Ok(Json(views))
}

async fn refresh_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntryView>>> {
    tracing::info!("Leaderboard refresh requested");
    let snapshot = state.leaderboard.refresh().await?;

    let views = enrich(
        &snapshot.entries,
        &state.db.list_users().await?,
        &state.db.list_teams().await?,
    );
    Ok(Json(views))
}

/// Attach current user and team names to snapshot entries.
fn enrich(entries: &[LeaderboardEntry], users: &[User], teams: &[Team]) -> Vec<LeaderboardEntryView> {
    let user_names: HashMap<Uuid, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();
    let team_names: HashMap<Uuid, &str> = teams.iter().map(|t| (t.id, t.name.as_str())).collect();

    entries
        .iter()
        .map(|entry| LeaderboardEntryView {
            user_id: entry.user_id,
            user: user_names
                .get(&entry.user_id)
                .copied()
                .unwrap_or(UNKNOWN_USER)
                .to_string(),
            team_id: entry.team_id,
            team: entry
                .team_id
                .and_then(|t| team_names.get(&t))
                .map(|name| name.to_string()),
            total_calories: entry.total_calories,
            total_activities: entry.total_activities,
            total_duration: entry.total_duration,
            rank: entry.rank,
            updated_at: entry.updated_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(user_id: Uuid, team_id: Option<Uuid>, rank: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id,
            team_id,
            total_calories: 1000 / rank as u64,
            total_activities: 2,
            total_duration: 90,
            rank,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_enrich_resolves_names() {
        let team = Team {
            id: Uuid::new_v4(),
            name: "Team Marvel".to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        let user = User {
            id: Uuid::new_v4(),
            name: "Wonder Woman".to_string(),
            email: "diana.prince@dc.com".to_string(),
            password_hash: "x".to_string(),
            team_id: Some(team.id),
            created_at: Utc::now(),
        };

        let views = enrich(
            &[entry(user.id, Some(team.id), 1)],
            &[user.clone()],
            &[team.clone()],
        );

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].user, "Wonder Woman");
        assert_eq!(views[0].team.as_deref(), Some("Team Marvel"));
        assert_eq!(views[0].rank, 1);
        assert_eq!(views[0].total_calories, 1000);
    }

    #[test]
    fn test_enrich_handles_deleted_user_and_team() {
        let views = enrich(
            &[
                entry(Uuid::new_v4(), Some(Uuid::new_v4()), 1),
                entry(Uuid::new_v4(), None, 2),
            ],
            &[],
            &[],
        );

        assert_eq!(views[0].user, UNKNOWN_USER);
        assert_eq!(views[0].team, None);
        assert!(views[0].team_id.is_some());
        assert_eq!(views[1].team_id, None);
        assert_eq!(views[1].rank, 2);
    }
}
