// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process storage backend.
//!
//! All tables live behind one lock, so every operation (including
//! [`Database::read_snapshot`]) sees a consistent state, and replacing the
//! leaderboard is a single pointer swap.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{
    same_email, sort_activities, sort_teams, sort_users, sort_workouts, ActivityFilter,
    ClearedCounts, DataSnapshot, Database,
};
use crate::error::{AppError, Result};
use crate::models::{Activity, LeaderboardSnapshot, Team, User, Workout};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    teams: HashMap<Uuid, Team>,
    activities: HashMap<Uuid, Activity>,
    workouts: HashMap<Uuid, Workout>,
    leaderboard: Option<Arc<LeaderboardSnapshot>>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && same_email(&u.email, email))
    }
}

/// In-memory database. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an activity without checking that its user exists.
    #[cfg(test)]
    pub(crate) async fn insert_activity_unchecked(&self, activity: &Activity) {
        self.tables
            .write()
            .await
            .activities
            .insert(activity.id, activity.clone());
    }
}

#[async_trait]
impl Database for MemoryDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        sort_users(&mut users);
        Ok(users)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("User {} not found", user.id)));
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.activities.retain(|_, a| a.user_id != id);
        Ok(true)
    }

    // ─── Teams ───────────────────────────────────────────────────

    async fn list_teams(&self) -> Result<Vec<Team>> {
        let mut teams: Vec<Team> = self.tables.read().await.teams.values().cloned().collect();
        sort_teams(&mut teams);
        Ok(teams)
    }

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
        Ok(self.tables.read().await.teams.get(&id).cloned())
    }

    async fn insert_team(&self, team: &Team) -> Result<()> {
        self.tables.write().await.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn update_team(&self, team: &Team) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.teams.get_mut(&team.id) {
            Some(existing) => {
                *existing = team.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Team {} not found", team.id))),
        }
    }

    async fn delete_team(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.teams.remove(&id).is_none() {
            return Ok(false);
        }
        for user in tables.users.values_mut() {
            if user.team_id == Some(id) {
                user.team_id = None;
            }
        }
        Ok(true)
    }

    async fn count_team_members(&self, team_id: Uuid) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.team_id == Some(team_id))
            .count() as u64)
    }

    // ─── Activities ──────────────────────────────────────────────

    async fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = self
            .tables
            .read()
            .await
            .activities
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        sort_activities(&mut activities);
        Ok(activities)
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>> {
        Ok(self.tables.read().await.activities.get(&id).cloned())
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&activity.user_id) {
            return Err(AppError::BadRequest(format!(
                "User {} does not exist",
                activity.user_id
            )));
        }
        tables.activities.insert(activity.id, activity.clone());
        Ok(())
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.activities.remove(&id).is_some())
    }

    // ─── Workouts ────────────────────────────────────────────────

    async fn list_workouts(&self) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> =
            self.tables.read().await.workouts.values().cloned().collect();
        sort_workouts(&mut workouts);
        Ok(workouts)
    }

    async fn get_workout(&self, id: Uuid) -> Result<Option<Workout>> {
        Ok(self.tables.read().await.workouts.get(&id).cloned())
    }

    async fn insert_workout(&self, workout: &Workout) -> Result<()> {
        self.tables
            .write()
            .await
            .workouts
            .insert(workout.id, workout.clone());
        Ok(())
    }

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn read_snapshot(&self) -> Result<DataSnapshot> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        let mut activities: Vec<Activity> = tables.activities.values().cloned().collect();
        drop(tables);

        sort_users(&mut users);
        sort_activities(&mut activities);
        Ok(DataSnapshot { users, activities })
    }

    async fn get_leaderboard(&self) -> Result<Option<LeaderboardSnapshot>> {
        Ok(self
            .tables
            .read()
            .await
            .leaderboard
            .as_deref()
            .cloned())
    }

    async fn replace_leaderboard(&self, snapshot: &LeaderboardSnapshot) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables
            .leaderboard
            .as_ref()
            .is_some_and(|stored| stored.generated_at > snapshot.generated_at)
        {
            return Ok(false);
        }
        tables.leaderboard = Some(Arc::new(snapshot.clone()));
        Ok(true)
    }

    // ─── Maintenance ─────────────────────────────────────────────

    async fn clear_all(&self) -> Result<ClearedCounts> {
        let mut tables = self.tables.write().await;
        let counts = ClearedCounts {
            users: tables.users.len(),
            teams: tables.teams.len(),
            activities: tables.activities.len(),
            workouts: tables.workouts.len(),
        };
        *tables = Tables::default();
        Ok(counts)
    }
}
