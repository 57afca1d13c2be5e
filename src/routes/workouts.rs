// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout catalog routes.

use crate::error::{AppError, Result};
use crate::models::{CreateWorkoutRequest, Difficulty, Workout};
use crate::routes::extract::ApiJson;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Read-only catalog routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts))
        .route("/api/workouts/{id}", get(get_workout))
}

/// Catalog maintenance (admin key required; applied in routes/mod.rs).
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/workouts", post(create_workout))
}

#[derive(Deserialize)]
struct WorkoutsQuery {
    difficulty: Option<Difficulty>,
    activity_type: Option<String>,
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WorkoutsQuery>,
) -> Result<Json<Vec<Workout>>> {
    let workouts = state
        .db
        .list_workouts()
        .await?
        .into_iter()
        .filter(|w| params.difficulty.is_none_or(|d| w.difficulty == d))
        .filter(|w| {
            params
                .activity_type
                .as_deref()
                .is_none_or(|t| w.activity_type.eq_ignore_ascii_case(t))
        })
        .collect();
    Ok(Json(workouts))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Workout>> {
    state
        .db
        .get_workout(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<Workout>)> {
    body.validate()?;

    let workout = Workout {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        description: body.description,
        activity_type: body.activity_type.trim().to_string(),
        difficulty: body.difficulty,
        duration: body.duration,
        calories_per_session: body.calories_per_session,
        created_at: chrono::Utc::now(),
    };
    state.db.insert_workout(&workout).await?;

    tracing::info!(workout_id = %workout.id, name = %workout.name, "Added workout");
    Ok((StatusCode::CREATED, Json(workout)))
}
