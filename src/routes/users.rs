// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User CRUD routes.

use crate::error::{AppError, Result};
use crate::models::user::normalize_email;
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserResponse};
use crate::routes::ensure_team_exists;
use crate::routes::extract::ApiJson;
use crate::services::password::hash_password_blocking;
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
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

async fn load_user(state: &AppState, id: Uuid) -> Result<User> {
    state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>> {
    let user = load_user(&state, id).await?;
    Ok(Json(UserResponse::from(&user)))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    body.validate()?;
    if let Some(team_id) = body.team_id {
        ensure_team_exists(&state, team_id).await?;
    }

    let user = User {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        email: normalize_email(&body.email),
        password_hash: hash_password_blocking(body.password).await?,
        team_id: body.team_id,
        created_at: chrono::Utc::now(),
    };
    state.db.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, team_id = ?user.team_id, "Created user");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    body.validate()?;
    let mut user = load_user(&state, id).await?;

    if let Some(name) = body.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = body.email {
        user.email = normalize_email(&email);
    }
    if let Some(password) = body.password {
        user.password_hash = hash_password_blocking(password).await?;
    }
    if let Some(team_id) = body.team_id {
        if let Some(team_id) = team_id {
            ensure_team_exists(&state, team_id).await?;
        }
        user.team_id = team_id;
    }

    state.db.update_user(&user).await?;

    tracing::info!(user_id = %user.id, "Updated user");
    Ok(Json(UserResponse::from(&user)))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_user(id).await? {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    tracing::info!(user_id = %id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
