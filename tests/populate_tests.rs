// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sample data population against the in-memory store.

use axum::http::StatusCode;
use chrono::Utc;
use octofit_tracker::db::{ActivityFilter, Database, MemoryDb};
use octofit_tracker::error::Result;
use octofit_tracker::services::{generate_dataset, populate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

mod common;

fn fake_hash(password: &str) -> Result<String> {
    Ok(format!("hashed:{}", password))
}

#[tokio::test]
async fn test_populate_writes_everything_and_ranks() {
    let db: Arc<dyn Database> = Arc::new(MemoryDb::new());
    let dataset = generate_dataset(&mut StdRng::seed_from_u64(11), Utc::now(), fake_hash).unwrap();
    let activity_count = dataset.activities.len();

    let report = populate(db.clone(), dataset).await.unwrap();

    assert_eq!(report.teams, 2);
    assert_eq!(report.users, 12);
    assert_eq!(report.workouts, 8);
    assert_eq!(report.activities, activity_count);

    assert_eq!(db.list_teams().await.unwrap().len(), 2);
    assert_eq!(db.list_users().await.unwrap().len(), 12);
    assert_eq!(db.list_workouts().await.unwrap().len(), 8);
    assert_eq!(
        db.list_activities(&ActivityFilter::default()).await.unwrap().len(),
        activity_count
    );

    let board = db.get_leaderboard().await.unwrap().unwrap();
    assert_eq!(board.entries.len(), 12);
    let ranks: Vec<u32> = board.entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, (1..=12).collect::<Vec<u32>>());
    assert!(board
        .entries
        .windows(2)
        .all(|w| w[0].total_calories >= w[1].total_calories));

    assert_eq!(report.podium.len(), 3);
    assert_eq!(report.podium[0].rank, 1);
    assert_eq!(report.podium[0].total_calories, board.entries[0].total_calories);
    assert!(!report.podium[0].name.is_empty());
}

#[tokio::test]
async fn test_populate_replaces_previous_data() {
    let db: Arc<dyn Database> = Arc::new(MemoryDb::new());
    let now = Utc::now();

    let first = generate_dataset(&mut StdRng::seed_from_u64(1), now, fake_hash).unwrap();
    populate(db.clone(), first).await.unwrap();

    let second = generate_dataset(&mut StdRng::seed_from_u64(2), now, fake_hash).unwrap();
    let second_activities = second.activities.len();
    let second_user_ids: Vec<_> = second.users.iter().map(|u| u.id).collect();
    populate(db.clone(), second).await.unwrap();

    let users = db.list_users().await.unwrap();
    assert_eq!(users.len(), 12);
    assert!(users.iter().all(|u| second_user_ids.contains(&u.id)));
    assert_eq!(
        db.list_activities(&ActivityFilter::default()).await.unwrap().len(),
        second_activities
    );
}

#[tokio::test]
async fn test_seeded_store_serves_api() {
    let (app, state) = common::create_test_app();
    let dataset = generate_dataset(&mut StdRng::seed_from_u64(5), Utc::now(), fake_hash).unwrap();
    populate(state.db.clone(), dataset).await.unwrap();

    let teams = common::expect_json(&app, "GET", "/api/teams", None, StatusCode::OK).await;
    let teams = teams.as_array().unwrap();
    assert_eq!(teams.len(), 2);
    assert!(teams.iter().all(|t| t["member_count"] == 6));

    let board = common::expect_json(&app, "GET", "/api/leaderboard", None, StatusCode::OK).await;
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 12);
    assert!(board.iter().all(|e| e["user"] != "Unknown User"));
    assert!(board.iter().all(|e| e["team"].is_string()));
}
