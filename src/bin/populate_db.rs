// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Replace the configured store's contents with sample superhero data.

use clap::Parser;
use octofit_tracker::{
    config::{Config, StorageBackend},
    db::{Database, FirestoreDb, MemoryDb},
    services::{generate_sample_dataset, populate},
    telemetry::init_logging,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "Populate the OctoFit database with test data")]
struct Args {
    /// Seed for the random activity generator (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let config = Config::from_env()?;

    let db: Arc<dyn Database> = match (config.storage, config.gcp_project_id.as_deref()) {
        (StorageBackend::Firestore, Some(project_id)) => Arc::new(FirestoreDb::new(project_id).await?),
        (StorageBackend::Firestore, None) => anyhow::bail!("GCP_PROJECT_ID is required for Firestore"),
        (StorageBackend::Memory, _) => {
            tracing::warn!("Populating in-memory storage; nothing will persist after exit");
            Arc::new(MemoryDb::new())
        }
    };

    let dataset = generate_sample_dataset(args.seed).await?;
    let report = populate(db, dataset).await?;

    tracing::info!(
        teams = report.teams,
        users = report.users,
        workouts = report.workouts,
        activities = report.activities,
        leaderboard_entries = report.leaderboard.entries.len(),
        "Database populated"
    );
    for place in &report.podium {
        tracing::info!(
            rank = place.rank,
            name = %place.name,
            total_calories = place.total_calories,
            "Top performer"
        );
    }

    Ok(())
}
