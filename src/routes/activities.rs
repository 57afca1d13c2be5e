// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity routes.

use crate::db::ActivityFilter;
use crate::error::{AppError, Result};
use crate::models::{Activity, CreateActivityRequest};
use crate::routes::extract::ApiJson;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const MAX_ACTIVITY_TYPE_LEN: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route(
            "/api/activities/{id}",
            get(get_activity).delete(delete_activity),
        )
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Only this user's activities
    user_id: Option<Uuid>,
    /// Only this type (case-insensitive)
    activity_type: Option<String>,
}

/// List activities, newest first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<Vec<Activity>>> {
    if params
        .activity_type
        .as_ref()
        .is_some_and(|t| t.len() > MAX_ACTIVITY_TYPE_LEN)
    {
        return Err(AppError::BadRequest(
            "activity_type filter is too long".to_string(),
        ));
    }

    tracing::debug!(
        user_id = ?params.user_id,
        activity_type = ?params.activity_type,
        "Fetching activities"
    );

    let filter = ActivityFilter {
        user_id: params.user_id,
        activity_type: params.activity_type,
    };
    Ok(Json(state.db.list_activities(&filter).await?))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>> {
    state
        .db
        .get_activity(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))
}

/// Log an activity. The leaderboard picks it up on its next rebuild.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Activity>)> {
    body.validate()?;

    let activity = Activity {
        id: Uuid::new_v4(),
        user_id: body.user_id,
        activity_type: body.activity_type.trim().to_string(),
        duration: body.duration,
        distance: body.distance,
        calories: body.calories,
        date: body.date,
        created_at: chrono::Utc::now(),
    };
    state.db.insert_activity(&activity).await?;

    tracing::info!(
        activity_id = %activity.id,
        user_id = %activity.user_id,
        activity_type = %activity.activity_type,
        calories = activity.calories,
        "Logged activity"
    );
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_activity(id).await? {
        return Err(AppError::NotFound(format!("Activity {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
