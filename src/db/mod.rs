//! Database layer.
//!
//! [`Database`] is implemented by [`FirestoreDb`] for production and by
//! [`MemoryDb`] for tests and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Activity, LeaderboardSnapshot, Team, User, Workout};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TEAMS: &str = "teams";
    pub const ACTIVITIES: &str = "activities";
    pub const WORKOUTS: &str = "workouts";
    /// Holds a single document with the current leaderboard snapshot
    pub const LEADERBOARD: &str = "leaderboard";
    pub const LEADERBOARD_DOC_ID: &str = "current";
}

/// Optional filters for activity listings.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub user_id: Option<Uuid>,
    pub activity_type: Option<String>,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        self.user_id.is_none_or(|id| activity.user_id == id)
            && self
                .activity_type
                .as_deref()
                .is_none_or(|t| activity.activity_type.eq_ignore_ascii_case(t))
    }
}

/// Point-in-time view of the inputs to a leaderboard build.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub users: Vec<User>,
    pub activities: Vec<Activity>,
}

/// Record counts removed by [`Database::clear_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub users: usize,
    pub teams: usize,
    pub activities: usize,
    pub workouts: usize,
}

/// Storage operations used by the API and the populate workflow.
///
/// Lists are returned in a stable order: users, teams and workouts by
/// creation time, activities newest `date` first.
#[async_trait]
pub trait Database: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Fails with `Conflict` if the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Fails with `NotFound` if the user does not exist and with `Conflict`
    /// if the new email belongs to someone else.
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Delete a user and all of their activities. Returns `false` if the
    /// user did not exist.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;

    // ─── Teams ───────────────────────────────────────────────────

    async fn list_teams(&self) -> Result<Vec<Team>>;

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>>;

    async fn insert_team(&self, team: &Team) -> Result<()>;

    async fn update_team(&self, team: &Team) -> Result<()>;

    /// Delete a team and clear `team_id` on its members.
    async fn delete_team(&self, id: Uuid) -> Result<bool>;

    async fn count_team_members(&self, team_id: Uuid) -> Result<u64>;

    // ─── Activities ──────────────────────────────────────────────

    async fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>>;

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>>;

    async fn insert_activity(&self, activity: &Activity) -> Result<()>;

    async fn delete_activity(&self, id: Uuid) -> Result<bool>;

    // ─── Workouts ────────────────────────────────────────────────

    async fn list_workouts(&self) -> Result<Vec<Workout>>;

    async fn get_workout(&self, id: Uuid) -> Result<Option<Workout>>;

    async fn insert_workout(&self, workout: &Workout) -> Result<()>;

    // ─── Leaderboard ─────────────────────────────────────────────

    /// All users and activities as of one point in time.
    async fn read_snapshot(&self) -> Result<DataSnapshot>;

    async fn get_leaderboard(&self) -> Result<Option<LeaderboardSnapshot>>;

    /// Replace the stored leaderboard in one write.
    ///
    /// A snapshot generated before the stored one is not written and
    /// `Ok(false)` is returned, so an overlapping slower rebuild cannot
    /// roll the leaderboard back.
    async fn replace_leaderboard(&self, snapshot: &LeaderboardSnapshot) -> Result<bool>;

    // ─── Maintenance ─────────────────────────────────────────────

    /// Remove every record, including the stored leaderboard.
    async fn clear_all(&self) -> Result<ClearedCounts>;
}

pub(crate) fn sort_users(users: &mut [User]) {
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

pub(crate) fn sort_teams(teams: &mut [Team]) {
    teams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

pub(crate) fn sort_workouts(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

pub(crate) fn sort_activities(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
}

/// Emails are unique regardless of case.
pub(crate) fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
