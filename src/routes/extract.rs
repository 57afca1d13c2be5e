// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request body extraction.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;

use crate::error::AppError;

/// JSON body extractor whose rejections use the API error format.
///
/// Malformed JSON, a missing content type, and bodies that do not match the
/// request type (missing fields, negative counts) all answer 400 with the
/// usual `{error, details}` body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
