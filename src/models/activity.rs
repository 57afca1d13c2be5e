// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Logged activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Activity types that carry a meaningful distance.
pub const DISTANCE_ACTIVITY_TYPES: [&str; 3] = ["Running", "Swimming", "Cycling"];

/// A single logged exercise event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct Activity {
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Free-form type tag (Running, Yoga, HIIT, ...)
    pub activity_type: String,
    /// Duration in minutes
    pub duration: u32,
    /// Distance in km, only for distance-based types
    pub distance: Option<f64>,
    pub calories: u32,
    /// When the activity happened
    pub date: DateTime<Utc>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/activities`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub activity_type: String,
    #[validate(range(min = 1))]
    pub duration: u32,
    #[validate(range(exclusive_min = 0.0))]
    pub distance: Option<f64>,
    #[validate(range(min = 1))]
    pub calories: u32,
    pub date: DateTime<Utc>,
}

/// Whether an activity type is distance-based.
pub fn is_distance_type(activity_type: &str) -> bool {
    DISTANCE_ACTIVITY_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(activity_type))
}
