// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard computation.
//!
//! [`build_leaderboard`] is a pure function over a snapshot of users and
//! activities. [`LeaderboardService`] wraps it with the storage round trip:
//! read a consistent snapshot, build, and replace the stored leaderboard in
//! a single write. Nothing is written if the build fails.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Activity, LeaderboardEntry, LeaderboardSnapshot, User};

/// Leaderboard build failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaderboardError {
    /// An activity belongs to a user that is not part of the input.
    #[error("activity {activity_id} references unknown user {user_id}")]
    UnknownUser { activity_id: Uuid, user_id: Uuid },
}

/// Running totals for one user.
struct Tally {
    user_id: Uuid,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    calories: u64,
    activities: u64,
    duration: u64,
}

/// Build a ranked leaderboard from users and their activities.
///
/// Every user gets exactly one entry, including users with no activities.
/// Entries are ordered by total calories, highest first. Equal totals are
/// ordered by user creation time and then by user id, and every entry gets
/// its own rank: ranks are always `1..=n` with no gaps or repeats.
///
/// Fails without producing anything if an activity references a user that
/// is not in `users`. Duplicate users (same id) count once.
pub fn build_leaderboard(
    users: &[User],
    activities: &[Activity],
    now: DateTime<Utc>,
) -> std::result::Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let mut tallies: Vec<Tally> = Vec::with_capacity(users.len());
    let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(users.len());

    for user in users {
        index.entry(user.id).or_insert_with(|| {
            tallies.push(Tally {
                user_id: user.id,
                team_id: user.team_id,
                created_at: user.created_at,
                calories: 0,
                activities: 0,
                duration: 0,
            });
            tallies.len() - 1
        });
    }

    for activity in activities {
        let slot = *index
            .get(&activity.user_id)
            .ok_or(LeaderboardError::UnknownUser {
                activity_id: activity.id,
                user_id: activity.user_id,
            })?;
        let tally = &mut tallies[slot];
        tally.calories += u64::from(activity.calories);
        tally.duration += u64::from(activity.duration);
        tally.activities += 1;
    }

    tallies.sort_by(|a, b| {
        b.calories
            .cmp(&a.calories)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    Ok((1u32..)
        .zip(tallies)
        .map(|(rank, tally)| LeaderboardEntry {
            user_id: tally.user_id,
            team_id: tally.team_id,
            total_calories: tally.calories,
            total_activities: tally.activities,
            total_duration: tally.duration,
            rank,
            updated_at: now,
        })
        .collect())
}

/// Rebuilds and serves the stored leaderboard.
#[derive(Clone)]
pub struct LeaderboardService {
    db: Arc<dyn Database>,
}

impl LeaderboardService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Recompute the leaderboard from current data and replace the stored one.
    pub async fn refresh(&self) -> Result<LeaderboardSnapshot> {
        let data = self.db.read_snapshot().await?;
        let now = Utc::now();

        let entries = build_leaderboard(&data.users, &data.activities, now).inspect_err(|e| {
            tracing::warn!(error = %e, "Leaderboard rebuild aborted");
        })?;

        let snapshot = LeaderboardSnapshot {
            generated_at: now,
            entries,
        };
        if !self.db.replace_leaderboard(&snapshot).await? {
            tracing::info!(
                generated_at = %snapshot.generated_at,
                "Newer leaderboard already stored, keeping it"
            );
            return self.current().await;
        }

        tracing::info!(
            users = data.users.len(),
            activities = data.activities.len(),
            "Leaderboard rebuilt"
        );

        Ok(snapshot)
    }

    /// The stored leaderboard, or an empty one if none was ever built.
    pub async fn current(&self) -> Result<LeaderboardSnapshot> {
        Ok(self
            .db
            .get_leaderboard()
            .await?
            .unwrap_or_else(LeaderboardSnapshot::empty))
    }

    /// Rebuild the leaderboard on a fixed interval until the runtime shuts down.
    pub fn spawn_periodic(self, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    tracing::warn!(error = %e, "Scheduled leaderboard rebuild failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDb;
    use crate::error::AppError;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn user(name: &str, created: i64, team_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: String::new(),
            team_id,
            created_at: at(created),
        }
    }

    fn activity(user: &User, calories: u32, duration: u32) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            user_id: user.id,
            activity_type: "Running".to_string(),
            duration,
            distance: Some(5.0),
            calories,
            date: at(3600),
            created_at: at(3600),
        }
    }

    #[test]
    fn test_ranks_by_total_calories() {
        let a = user("A", 0, None);
        let b = user("B", 1, None);
        let activities = vec![
            activity(&a, 100, 10),
            activity(&a, 50, 5),
            activity(&b, 200, 20),
        ];

        let board = build_leaderboard(&[a.clone(), b.clone()], &activities, at(0)).unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, b.id);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].total_calories, 200);
        assert_eq!(board[1].user_id, a.id);
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[1].total_calories, 150);
        assert_eq!(board[1].total_activities, 2);
        assert_eq!(board[1].total_duration, 15);
    }

    #[test]
    fn test_users_without_activities_get_zero_totals() {
        let a = user("A", 0, None);
        let b = user("B", 1, None);

        let board = build_leaderboard(&[b.clone(), a.clone()], &[], at(0)).unwrap();

        // Tie on zero calories: earlier-created user ranks first.
        assert_eq!(board[0].user_id, a.id);
        assert_eq!(board[1].user_id, b.id);
        assert_eq!(
            board.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2]
        );
        for entry in &board {
            assert_eq!(entry.total_calories, 0);
            assert_eq!(entry.total_activities, 0);
            assert_eq!(entry.total_duration, 0);
        }
    }

    #[test]
    fn test_ties_with_same_creation_time_break_by_id() {
        let a = user("A", 0, None);
        let b = user("B", 0, None);
        let activities = vec![activity(&a, 300, 30), activity(&b, 300, 30)];

        let board = build_leaderboard(&[a.clone(), b.clone()], &activities, at(0)).unwrap();

        let (first, second) = if a.id < b.id { (a.id, b.id) } else { (b.id, a.id) };
        assert_eq!(board[0].user_id, first);
        assert_eq!(board[1].user_id, second);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_unknown_user_rejects_whole_build() {
        let a = user("A", 0, None);
        let c = user("C", 2, None);
        let stray = activity(&c, 80, 8);
        let activities = vec![activity(&a, 100, 10), stray.clone()];

        let err = build_leaderboard(&[a], &activities, at(0)).unwrap_err();

        assert_eq!(
            err,
            LeaderboardError::UnknownUser {
                activity_id: stray.id,
                user_id: c.id,
            }
        );
    }

    #[test]
    fn test_empty_input_is_empty_board() {
        let board = build_leaderboard(&[], &[], at(0)).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_team_copied_from_user() {
        let team = Uuid::new_v4();
        let a = user("A", 0, Some(team));
        let b = user("B", 1, None);

        let board = build_leaderboard(&[a.clone(), b.clone()], &[], at(0)).unwrap();

        let team_of = |id: Uuid| board.iter().find(|e| e.user_id == id).unwrap().team_id;
        assert_eq!(team_of(a.id), Some(team));
        assert_eq!(team_of(b.id), None);
    }

    #[test]
    fn test_duplicate_users_count_once() {
        let a = user("A", 0, None);
        let activities = vec![activity(&a, 100, 10)];

        let board = build_leaderboard(&[a.clone(), a.clone()], &activities, at(0)).unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].total_calories, 100);
    }

    #[test]
    fn test_build_is_idempotent_and_consistent() {
        let users: Vec<User> = (0..20)
            .map(|i| user(&format!("U{}", i), i % 4, None))
            .collect();
        let activities: Vec<Activity> = users
            .iter()
            .enumerate()
            .flat_map(|(i, u)| {
                (0..(i % 5))
                    .map(|j| activity(u, (((i * 37 + j * 11) % 7) * 50) as u32 + 1, 10))
                    .collect::<Vec<_>>()
            })
            .collect();

        let first = build_leaderboard(&users, &activities, at(99)).unwrap();
        let second = build_leaderboard(&users, &activities, at(99)).unwrap();
        assert_eq!(first, second);

        assert_eq!(first.len(), users.len());
        let ranks: Vec<u32> = first.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=users.len() as u32).collect::<Vec<_>>());

        for pair in first.windows(2) {
            assert!(pair[0].total_calories >= pair[1].total_calories);
        }

        for entry in &first {
            let expected: u64 = activities
                .iter()
                .filter(|a| a.user_id == entry.user_id)
                .map(|a| u64::from(a.calories))
                .sum();
            let count = activities
                .iter()
                .filter(|a| a.user_id == entry.user_id)
                .count() as u64;
            assert_eq!(entry.total_calories, expected);
            assert_eq!(entry.total_activities, count);
            assert_eq!(entry.updated_at, at(99));
        }
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_leaderboard() {
        let db = MemoryDb::new();
        let service = LeaderboardService::new(Arc::new(db.clone()));

        let a = user("A", 0, None);
        db.insert_user(&a).await.unwrap();
        db.insert_activity(&activity(&a, 120, 12)).await.unwrap();
        let published = service.refresh().await.unwrap();
        assert_eq!(published.entries.len(), 1);

        let ghost = user("Ghost", 1, None);
        db.insert_activity_unchecked(&activity(&ghost, 999, 60)).await;

        let err = service.refresh().await.unwrap_err();
        assert!(matches!(err, AppError::Integrity(_)));
        assert_eq!(db.get_leaderboard().await.unwrap(), Some(published.clone()));
        assert_eq!(service.current().await.unwrap(), published);
    }

    #[tokio::test]
    async fn test_refresh_does_not_overwrite_newer_leaderboard() {
        let db = MemoryDb::new();
        let service = LeaderboardService::new(Arc::new(db.clone()));

        let newer = LeaderboardSnapshot {
            generated_at: Utc::now() + chrono::Duration::hours(1),
            entries: vec![],
        };
        assert!(db.replace_leaderboard(&newer).await.unwrap());

        let a = user("A", 0, None);
        db.insert_user(&a).await.unwrap();
        let returned = service.refresh().await.unwrap();

        assert_eq!(returned, newer);
        assert_eq!(db.get_leaderboard().await.unwrap(), Some(newer));
    }
}
