// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OctoFit Tracker API Server

use octofit_tracker::{
    config::{Config, StorageBackend},
    db::{Database, FirestoreDb, MemoryDb},
    services::{generate_sample_dataset, populate},
    telemetry::init_logging,
    AppState,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, storage = ?config.storage, "Starting OctoFit Tracker API");

    let db: Arc<dyn Database> = match (config.storage, config.gcp_project_id.as_deref()) {
        (StorageBackend::Firestore, Some(project_id)) => Arc::new(FirestoreDb::new(project_id).await?),
        (StorageBackend::Firestore, None) => anyhow::bail!("GCP_PROJECT_ID is required for Firestore"),
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Arc::new(MemoryDb::new())
        }
    };

    if config.seed_on_startup {
        let dataset = generate_sample_dataset(None).await?;
        let report = populate(db.clone(), dataset).await?;
        tracing::info!(
            users = report.users,
            activities = report.activities,
            "Sample data loaded"
        );
    }

    let state = Arc::new(AppState::new(config.clone(), db));

    if config.leaderboard_refresh_secs > 0 {
        tracing::info!(
            every_secs = config.leaderboard_refresh_secs,
            "Scheduling leaderboard rebuilds"
        );
        state
            .leaderboard
            .clone()
            .spawn_periodic(Duration::from_secs(config.leaderboard_refresh_secs));
    }

    let app = octofit_tracker::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
