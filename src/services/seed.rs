// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sample data for demos and local development.
//!
//! Two superhero teams, six heroes each, a workout catalog, and a few weeks
//! of random activities per hero. Generation is separate from storage so a
//! seeded RNG reproduces the same dataset.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt, TryStreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::activity::is_distance_type;
use crate::models::{Activity, Difficulty, LeaderboardSnapshot, Team, User, Workout};
use crate::services::leaderboard::LeaderboardService;
use crate::services::password::hash_password;

const MAX_CONCURRENT_WRITES: usize = 50;

/// Activity types the generator picks from.
pub const ACTIVITY_TYPES: [&str; 7] = [
    "Running",
    "Swimming",
    "Cycling",
    "Weight Lifting",
    "Yoga",
    "HIIT",
    "Circuit Training",
];

pub const ACTIVITIES_PER_USER: std::ops::RangeInclusive<usize> = 5..=10;
pub const DURATION_MINUTES: std::ops::RangeInclusive<u32> = 20..=90;
pub const CALORIES_PER_MINUTE: std::ops::RangeInclusive<u32> = 6..=12;
pub const MAX_DAYS_AGO: i64 = 30;

struct TeamSeed {
    name: &'static str,
    description: &'static str,
    /// (name, email, password)
    heroes: [(&'static str, &'static str, &'static str); 6],
}

const TEAMS: [TeamSeed; 2] = [
    TeamSeed {
        name: "Team Marvel",
        description: "Earth's Mightiest Heroes - Fighting for fitness!",
        heroes: [
            ("Iron Man", "tony.stark@marvel.com", "ironman123"),
            ("Captain America", "steve.rogers@marvel.com", "cap123"),
            ("Thor", "thor.odinson@marvel.com", "thor123"),
            ("Black Widow", "natasha.romanoff@marvel.com", "widow123"),
            ("Hulk", "bruce.banner@marvel.com", "hulk123"),
            ("Spider-Man", "peter.parker@marvel.com", "spidey123"),
        ],
    },
    TeamSeed {
        name: "Team DC",
        description: "Justice League - Defending health and wellness!",
        heroes: [
            ("Superman", "clark.kent@dc.com", "superman123"),
            ("Batman", "bruce.wayne@dc.com", "batman123"),
            ("Wonder Woman", "diana.prince@dc.com", "wonder123"),
            ("Flash", "barry.allen@dc.com", "flash123"),
            ("Aquaman", "arthur.curry@dc.com", "aquaman123"),
            ("Green Lantern", "hal.jordan@dc.com", "lantern123"),
        ],
    },
];

/// (name, description, activity_type, difficulty, duration, calories_per_session)
type WorkoutSeed = (&'static str, &'static str, &'static str, Difficulty, u32, u32);

const WORKOUTS: [WorkoutSeed; 8] = [
    (
        "Super Soldier Training",
        "Intense full-body workout inspired by Captain America",
        "Strength Training",
        Difficulty::Hard,
        60,
        500,
    ),
    (
        "Web-Slinger Cardio",
        "High-intensity cardio workout like Spider-Man",
        "Running",
        Difficulty::Medium,
        45,
        400,
    ),
    (
        "Asgardian Hammer Lift",
        "Heavy lifting workout worthy of Thor",
        "Weight Lifting",
        Difficulty::Hard,
        50,
        450,
    ),
    (
        "Speed Force Sprint",
        "Lightning-fast interval running workout",
        "Running",
        Difficulty::Hard,
        30,
        350,
    ),
    (
        "Atlantean Swim",
        "Endurance swimming workout like Aquaman",
        "Swimming",
        Difficulty::Medium,
        40,
        380,
    ),
    (
        "Bat-Cave Circuit",
        "Full-body circuit training in the dark",
        "Circuit Training",
        Difficulty::Hard,
        55,
        480,
    ),
    (
        "Amazon Warrior Yoga",
        "Flexibility and strength yoga session",
        "Yoga",
        Difficulty::Easy,
        35,
        200,
    ),
    (
        "Gamma Rage HIIT",
        "High-intensity interval training for explosive power",
        "HIIT",
        Difficulty::Hard,
        40,
        420,
    ),
];

/// Everything `populate` writes, generated up front.
#[derive(Debug, Clone)]
pub struct SeedDataset {
    pub teams: Vec<Team>,
    pub users: Vec<User>,
    pub workouts: Vec<Workout>,
    pub activities: Vec<Activity>,
}

/// One line of the post-seed podium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Podium {
    pub rank: u32,
    pub name: String,
    pub total_calories: u64,
}

/// What `populate` did.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub teams: usize,
    pub users: usize,
    pub workouts: usize,
    pub activities: usize,
    pub leaderboard: LeaderboardSnapshot,
    /// Top three by rank
    pub podium: Vec<Podium>,
}

/// Generate the sample dataset.
///
/// `hash` turns each hero's plaintext password into the stored credential.
/// Creation times increase by one millisecond per record so listing order
/// matches generation order.
pub fn generate_dataset<R, H>(rng: &mut R, now: DateTime<Utc>, hash: H) -> Result<SeedDataset>
where
    R: Rng,
    H: Fn(&str) -> Result<String>,
{
    let mut tick = 0i64;
    let mut next_created_at = || {
        tick += 1;
        now + Duration::milliseconds(tick)
    };

    let mut teams = Vec::with_capacity(TEAMS.len());
    let mut users = Vec::new();

    for seed in &TEAMS {
        let team = Team {
            id: Uuid::new_v4(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            created_at: next_created_at(),
        };

        for (name, email, password) in seed.heroes {
            users.push(User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash(password)?,
                team_id: Some(team.id),
                created_at: next_created_at(),
            });
        }

        teams.push(team);
    }

    let workouts = WORKOUTS
        .iter()
        .map(
            |&(name, description, activity_type, difficulty, duration, calories_per_session)| {
                Workout {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    description: description.to_string(),
                    activity_type: activity_type.to_string(),
                    difficulty,
                    duration,
                    calories_per_session,
                    created_at: next_created_at(),
                }
            },
        )
        .collect();

    let mut activities = Vec::new();
    for user in &users {
        for _ in 0..rng.gen_range(ACTIVITIES_PER_USER) {
            let activity_type = ACTIVITY_TYPES[rng.gen_range(0..ACTIVITY_TYPES.len())];
            let duration = rng.gen_range(DURATION_MINUTES);
            let distance = is_distance_type(activity_type)
                .then(|| (rng.gen_range(2.0..15.0_f64) * 100.0).round() / 100.0);
            let calories = duration * rng.gen_range(CALORIES_PER_MINUTE);
            let date = now - Duration::days(rng.gen_range(0..=MAX_DAYS_AGO));

            activities.push(Activity {
                id: Uuid::new_v4(),
                user_id: user.id,
                activity_type: activity_type.to_string(),
                duration,
                distance,
                calories,
                date,
                created_at: next_created_at(),
            });
        }
    }

    Ok(SeedDataset {
        teams,
        users,
        workouts,
        activities,
    })
}

/// [`generate_dataset`] with real password hashes, on the blocking pool.
///
/// `seed` makes the activity numbers reproducible; without it the RNG is
/// seeded from the OS.
pub async fn generate_sample_dataset(seed: Option<u64>) -> Result<SeedDataset> {
    tokio::task::spawn_blocking(move || {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        generate_dataset(&mut rng, Utc::now(), hash_password)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Dataset generation task failed: {}", e)))?
}

/// Replace all stored data with `dataset` and build the leaderboard.
pub async fn populate(db: Arc<dyn Database>, dataset: SeedDataset) -> Result<SeedReport> {
    let cleared = db.clear_all().await?;
    tracing::info!(?cleared, "Existing data cleared");

    for team in &dataset.teams {
        db.insert_team(team).await?;
    }
    tracing::info!(count = dataset.teams.len(), "Created teams");

    for user in &dataset.users {
        db.insert_user(user).await?;
    }
    tracing::info!(count = dataset.users.len(), "Created users");

    for workout in &dataset.workouts {
        db.insert_workout(workout).await?;
    }
    tracing::info!(count = dataset.workouts.len(), "Created workouts");

    stream::iter(&dataset.activities)
        .map(|activity| db.insert_activity(activity))
        .buffer_unordered(MAX_CONCURRENT_WRITES)
        .try_collect::<Vec<()>>()
        .await?;
    tracing::info!(count = dataset.activities.len(), "Created activities");

    let leaderboard = LeaderboardService::new(db.clone()).refresh().await?;

    let names: HashMap<Uuid, &str> = dataset
        .users
        .iter()
        .map(|u| (u.id, u.name.as_str()))
        .collect();
    let podium = leaderboard
        .top(3)
        .iter()
        .map(|entry| Podium {
            rank: entry.rank,
            name: names
                .get(&entry.user_id)
                .map_or_else(String::new, |n| n.to_string()),
            total_calories: entry.total_calories,
        })
        .collect();

    Ok(SeedReport {
        teams: dataset.teams.len(),
        users: dataset.users.len(),
        workouts: dataset.workouts.len(),
        activities: dataset.activities.len(),
        leaderboard,
        podium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_hash(password: &str) -> Result<String> {
        Ok(format!("hashed:{}", password))
    }

    #[test]
    fn test_dataset_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let data = generate_dataset(&mut rng, now, fake_hash).unwrap();

        assert_eq!(data.teams.len(), 2);
        assert_eq!(data.users.len(), 12);
        assert_eq!(data.workouts.len(), 8);

        for team in &data.teams {
            let members = data
                .users
                .iter()
                .filter(|u| u.team_id == Some(team.id))
                .count();
            assert_eq!(members, 6);
        }

        for user in &data.users {
            assert!(user.password_hash.starts_with("hashed:"));
            let count = data
                .activities
                .iter()
                .filter(|a| a.user_id == user.id)
                .count();
            assert!(ACTIVITIES_PER_USER.contains(&count), "count {}", count);
        }
    }

    #[test]
    fn test_activities_follow_generation_rules() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc::now();
        let data = generate_dataset(&mut rng, now, fake_hash).unwrap();

        for activity in &data.activities {
            assert!(ACTIVITY_TYPES.contains(&activity.activity_type.as_str()));
            assert!(DURATION_MINUTES.contains(&activity.duration));
            assert_eq!(activity.calories % activity.duration, 0);
            assert!(CALORIES_PER_MINUTE.contains(&(activity.calories / activity.duration)));
            assert!(activity.date <= now);
            assert!(activity.date >= now - Duration::days(MAX_DAYS_AGO));

            match activity.distance {
                Some(km) => {
                    assert!(is_distance_type(&activity.activity_type));
                    assert!((2.0..=15.0).contains(&km));
                }
                None => assert!(!is_distance_type(&activity.activity_type)),
            }
        }
    }

    #[test]
    fn test_same_seed_same_numbers() {
        let now = Utc::now();
        let a = generate_dataset(&mut StdRng::seed_from_u64(1), now, fake_hash).unwrap();
        let b = generate_dataset(&mut StdRng::seed_from_u64(1), now, fake_hash).unwrap();

        let numbers = |d: &SeedDataset| {
            d.activities
                .iter()
                .map(|a| (a.activity_type.clone(), a.duration, a.calories, a.date))
                .collect::<Vec<_>>()
        };
        assert_eq!(numbers(&a), numbers(&b));
    }

    #[test]
    fn test_hash_failure_aborts_generation() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = generate_dataset(&mut rng, Utc::now(), |_| {
            Err(crate::error::AppError::BadRequest("nope".to_string()))
        });
        assert!(result.is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_sample_dataset_uses_real_hashes() {
        let data = generate_sample_dataset(Some(11)).await.unwrap();

        assert_eq!(data.users.len(), 12);
        assert!(data
            .users
            .iter()
            .all(|u| u.password_hash.starts_with("$argon2id$")));
    }
}
