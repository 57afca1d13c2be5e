// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team CRUD routes.

use crate::error::{AppError, Result};
use crate::models::{CreateTeamRequest, Team, TeamResponse, UpdateTeamRequest};
use crate::routes::extract::ApiJson;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/teams", get(list_teams).post(create_team))
        .route(
            "/api/teams/{id}",
            get(get_team).patch(update_team).delete(delete_team),
        )
}

async fn load_team(state: &AppState, id: Uuid) -> Result<Team> {
    state
        .db
        .get_team(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
}

async fn with_member_count(state: &AppState, team: Team) -> Result<TeamResponse> {
    let members = state.db.count_team_members(team.id).await?;
    Ok(TeamResponse::new(team, members))
}

async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TeamResponse>>> {
    let teams = state.db.list_teams().await?;

    let mut responses = Vec::with_capacity(teams.len());
    for team in teams {
        responses.push(with_member_count(&state, team).await?);
    }
    Ok(Json(responses))
}

async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamResponse>> {
    let team = load_team(&state, id).await?;
    Ok(Json(with_member_count(&state, team).await?))
}

async fn create_team(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>)> {
    body.validate()?;

    let team = Team {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        description: body.description,
        created_at: chrono::Utc::now(),
    };
    state.db.insert_team(&team).await?;

    tracing::info!(team_id = %team.id, name = %team.name, "Created team");
    Ok((StatusCode::CREATED, Json(TeamResponse::new(team, 0))))
}

async fn update_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>> {
    body.validate()?;
    let mut team = load_team(&state, id).await?;

    if let Some(name) = body.name {
        team.name = name.trim().to_string();
    }
    if let Some(description) = body.description {
        team.description = description;
    }
    state.db.update_team(&team).await?;

    Ok(Json(with_member_count(&state, team).await?))
}

/// Members stay registered and simply lose their team.
async fn delete_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_team(id).await? {
        return Err(AppError::NotFound(format!("Team {} not found", id)));
    }

    tracing::info!(team_id = %id, "Deleted team");
    Ok(StatusCode::NO_CONTENT)
}
