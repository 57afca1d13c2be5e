// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Each record type lives in its own collection keyed by its UUID. The
//! leaderboard is one document (`leaderboard/current`) holding the whole
//! snapshot, so replacing it is a single atomic write.

use async_trait::async_trait;
use firestore::{
    FirestoreConsistencySelector, FirestoreTransaction, FirestoreTransactionMode,
    FirestoreTransactionOptions,
};
use uuid::Uuid;

use crate::db::{
    collections, same_email, sort_activities, sort_teams, sort_users, sort_workouts,
    ActivityFilter, ClearedCounts, DataSnapshot, Database,
};
use crate::error::{AppError, Result};
use crate::models::{Activity, LeaderboardSnapshot, Team, User, Workout};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

fn txn_err(what: &'static str) -> impl Fn(firestore::errors::FirestoreError) -> AppError {
    move |e| AppError::Database(format!("{}: {}", what, e))
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// A view of the database whose reads run inside `transaction`.
    fn in_transaction(&self, transaction: &FirestoreTransaction<'_>) -> Self {
        Self {
            client: self
                .client
                .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                    transaction.transaction_id().clone(),
                )),
        }
    }

    async fn get_doc<T>(&self, collection: &str, id: Uuid) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(db_err)
    }

    async fn list_docs<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.client
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn put_doc<T>(&self, collection: &str, id: &str, doc: &T) -> Result<()>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Sync + Send,
    {
        let _: T = self
            .client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(doc)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<()> {
        self.client
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(db_err)
    }

    async fn users_with_email(&self, email: &str) -> Result<Vec<User>> {
        let email = email.trim().to_string();
        self.client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn team_members(&self, team_id: Uuid) -> Result<Vec<User>> {
        let team_id = team_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("team_id").eq(team_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn activities_for_user(&self, user_id: Uuid) -> Result<Vec<Activity>> {
        let user_id = user_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(&self, items: &[T], collection: &str, id_extractor: F) -> Result<()>
    where
        F: Fn(&T) -> String,
    {
        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    async fn conflicting_email(&self, email: &str, except: Option<Uuid>) -> Result<bool> {
        Ok(self
            .users_with_email(email)
            .await?
            .iter()
            .any(|u| Some(u.id) != except && same_email(&u.email, email)))
    }
}

#[async_trait]
impl Database for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.list_docs(collections::USERS).await?;
        sort_users(&mut users);
        Ok(users)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.get_doc(collections::USERS, id).await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        // Query-then-write: two concurrent signups with one email can both pass.
        if self.conflicting_email(&user.email, None).await? {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }
        self.put_doc(collections::USERS, &user.id.to_string(), user)
            .await
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        if self.get_user(user.id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user.id)));
        }
        if self.conflicting_email(&user.email, Some(user.id)).await? {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }
        self.put_doc(collections::USERS, &user.id.to_string(), user)
            .await
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let existed = self.get_user(id).await?.is_some();

        // User first: once it is gone, insert_activity can no longer attach
        // new rows, so the sweep below sees every activity left behind.
        // The sweep also runs for a missing user to clear rows orphaned by
        // an earlier interrupted delete.
        if existed {
            self.delete_doc(collections::USERS, &id.to_string()).await?;
        }

        let activities = self.activities_for_user(id).await?;
        let count = activities.len();
        self.batch_delete(&activities, collections::ACTIVITIES, |a: &Activity| {
            a.id.to_string()
        })
        .await?;

        if existed {
            tracing::info!(user_id = %id, activities = count, "Deleted user and activities");
        } else if count > 0 {
            tracing::warn!(user_id = %id, activities = count, "Removed orphaned activities");
        }

        Ok(existed)
    }

    // ─── Team Operations ─────────────────────────────────────────

    async fn list_teams(&self) -> Result<Vec<Team>> {
        let mut teams: Vec<Team> = self.list_docs(collections::TEAMS).await?;
        sort_teams(&mut teams);
        Ok(teams)
    }

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
        self.get_doc(collections::TEAMS, id).await
    }

    async fn insert_team(&self, team: &Team) -> Result<()> {
        self.put_doc(collections::TEAMS, &team.id.to_string(), team)
            .await
    }

    async fn update_team(&self, team: &Team) -> Result<()> {
        if self.get_team(team.id).await?.is_none() {
            return Err(AppError::NotFound(format!("Team {} not found", team.id)));
        }
        self.put_doc(collections::TEAMS, &team.id.to_string(), team)
            .await
    }

    async fn delete_team(&self, id: Uuid) -> Result<bool> {
        if self.get_team(id).await?.is_none() {
            return Ok(false);
        }

        let members = self.team_members(id).await?;

        // Detach members and drop the team in one commit.
        // Member counts beyond BATCH_SIZE are not expected for teams.
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for member in &members {
            let detached = User {
                team_id: None,
                ..member.clone()
            };
            self.client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(detached.id.to_string())
                .object(&detached)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add member to transaction: {}", e))
                })?;
        }

        self.client
            .fluent()
            .delete()
            .from(collections::TEAMS)
            .document_id(id.to_string())
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add team deletion: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(team_id = %id, members = members.len(), "Deleted team");
        Ok(true)
    }

    async fn count_team_members(&self, team_id: Uuid) -> Result<u64> {
        Ok(self.team_members(team_id).await?.len() as u64)
    }

    // ─── Activity Operations ─────────────────────────────────────

    async fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = match filter.user_id {
            Some(user_id) => self.activities_for_user(user_id).await?,
            None => self.list_docs(collections::ACTIVITIES).await?,
        };
        // Type matching is case-insensitive, which Firestore cannot filter on.
        activities.retain(|a| filter.matches(a));
        sort_activities(&mut activities);
        Ok(activities)
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>> {
        self.get_doc(collections::ACTIVITIES, id).await
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        // The owner is read inside the write transaction, so a concurrent
        // user delete either lands first (and we reject) or aborts the commit.
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(txn_err("Failed to begin transaction"))?;

        let view = self.in_transaction(&transaction);
        let owner: Option<User> = view.get_doc(collections::USERS, activity.user_id).await?;
        if owner.is_none() {
            transaction.rollback().await.ok();
            return Err(AppError::BadRequest(format!(
                "User {} does not exist",
                activity.user_id
            )));
        }

        self.client
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(activity.id.to_string())
            .object(activity)
            .add_to_transaction(&mut transaction)
            .map_err(txn_err("Failed to add activity to transaction"))?;

        transaction
            .commit()
            .await
            .map_err(txn_err("Transaction commit failed"))?;
        Ok(())
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool> {
        if self.get_activity(id).await?.is_none() {
            return Ok(false);
        }
        self.delete_doc(collections::ACTIVITIES, &id.to_string())
            .await?;
        Ok(true)
    }

    // ─── Workout Operations ──────────────────────────────────────

    async fn list_workouts(&self) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self.list_docs(collections::WORKOUTS).await?;
        sort_workouts(&mut workouts);
        Ok(workouts)
    }

    async fn get_workout(&self, id: Uuid) -> Result<Option<Workout>> {
        self.get_doc(collections::WORKOUTS, id).await
    }

    async fn insert_workout(&self, workout: &Workout) -> Result<()> {
        self.put_doc(collections::WORKOUTS, &workout.id.to_string(), workout)
            .await
    }

    // ─── Leaderboard Operations ──────────────────────────────────

    async fn read_snapshot(&self) -> Result<DataSnapshot> {
        // Both collections are read in one read-only transaction, so they
        // reflect the same instant.
        let transaction = self
            .client
            .begin_transaction_with_options(
                FirestoreTransactionOptions::new().with_mode(FirestoreTransactionMode::ReadOnly),
            )
            .await
            .map_err(txn_err("Failed to begin read-only transaction"))?;

        let view = self.in_transaction(&transaction);
        let reads = async {
            let activities: Vec<Activity> = view.list_docs(collections::ACTIVITIES).await?;
            let users: Vec<User> = view.list_docs(collections::USERS).await?;
            Ok::<_, AppError>((users, activities))
        }
        .await;
        transaction.rollback().await.ok();

        let (mut users, mut activities) = reads?;
        sort_users(&mut users);
        sort_activities(&mut activities);
        Ok(DataSnapshot { users, activities })
    }

    async fn get_leaderboard(&self) -> Result<Option<LeaderboardSnapshot>> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::LEADERBOARD)
            .obj()
            .one(collections::LEADERBOARD_DOC_ID)
            .await
            .map_err(db_err)
    }

    async fn replace_leaderboard(&self, snapshot: &LeaderboardSnapshot) -> Result<bool> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(txn_err("Failed to begin transaction"))?;

        let view = self.in_transaction(&transaction);
        let stored: Option<LeaderboardSnapshot> = view
            .client
            .fluent()
            .select()
            .by_id_in(collections::LEADERBOARD)
            .obj()
            .one(collections::LEADERBOARD_DOC_ID)
            .await
            .map_err(db_err)?;

        if stored.is_some_and(|s| s.generated_at > snapshot.generated_at) {
            transaction.rollback().await.ok();
            tracing::debug!(
                generated_at = %snapshot.generated_at,
                "Skipped leaderboard snapshot older than the stored one"
            );
            return Ok(false);
        }

        self.client
            .fluent()
            .update()
            .in_col(collections::LEADERBOARD)
            .document_id(collections::LEADERBOARD_DOC_ID)
            .object(snapshot)
            .add_to_transaction(&mut transaction)
            .map_err(txn_err("Failed to add leaderboard to transaction"))?;

        transaction
            .commit()
            .await
            .map_err(txn_err("Transaction commit failed"))?;

        tracing::debug!(entries = snapshot.entries.len(), "Stored leaderboard snapshot");
        Ok(true)
    }

    // ─── Maintenance ─────────────────────────────────────────────

    async fn clear_all(&self) -> Result<ClearedCounts> {
        let activities: Vec<Activity> = self.list_docs(collections::ACTIVITIES).await?;
        self.batch_delete(&activities, collections::ACTIVITIES, |a: &Activity| {
            a.id.to_string()
        })
        .await?;

        let users: Vec<User> = self.list_docs(collections::USERS).await?;
        self.batch_delete(&users, collections::USERS, |u: &User| u.id.to_string())
            .await?;

        let teams: Vec<Team> = self.list_docs(collections::TEAMS).await?;
        self.batch_delete(&teams, collections::TEAMS, |t: &Team| t.id.to_string())
            .await?;

        let workouts: Vec<Workout> = self.list_docs(collections::WORKOUTS).await?;
        self.batch_delete(&workouts, collections::WORKOUTS, |w: &Workout| {
            w.id.to_string()
        })
        .await?;

        self.delete_doc(collections::LEADERBOARD, collections::LEADERBOARD_DOC_ID)
            .await?;

        let counts = ClearedCounts {
            users: users.len(),
            teams: teams.len(),
            activities: activities.len(),
            workouts: workouts.len(),
        };
        tracing::info!(?counts, "Cleared all collections");
        Ok(counts)
    }
}
