//! Demo service - manage demo mode
//!
//! Demo mode points every command at `demo.duckdb`, seeded with a sample
//! roster, so the dashboard can be explored without touching real member
//! data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::adapters::DuckDbStore;
use crate::config::Config;
use crate::domain::{
    Batch, FoodItem, Gender, LogEntry, Meals, Note, ProgramType, ProgressStatus, Trainer, User,
};
use crate::services::collection::{CollectionStore, IdStrategy};
use crate::services::metrics;

const DEMO_DB: &str = "demo.duckdb";
const DEMO_SEED: u64 = 42;

const NAMES: [&str; 20] = [
    "Rajesh Kumar",
    "Priya Sharma",
    "Amit Patel",
    "Sneha Reddy",
    "Vikram Singh",
    "Anjali Gupta",
    "Rahul Verma",
    "Pooja Nair",
    "Arjun Mehta",
    "Divya Iyer",
    "Karan Joshi",
    "Neha Kapoor",
    "Sanjay Rao",
    "Kavita Desai",
    "Rohan Pillai",
    "Meera Shah",
    "Aditya Kulkarni",
    "Ritu Malhotra",
    "Varun Chopra",
    "Shreya Menon",
];
const TRAINERS: [&str; 4] = ["Trainer A", "Trainer B", "Trainer C", "Trainer D"];
const MEAL_PLANS: [&str; 8] = [
    "Veg", "Non-Veg", "Detox", "Veg", "Non-Veg", "Veg", "Detox", "Non-Veg",
];
const STATUSES: [ProgressStatus; 5] = [
    ProgressStatus::OnTrack,
    ProgressStatus::AtRisk,
    ProgressStatus::Struggling,
    ProgressStatus::OnTrack,
    ProgressStatus::OnTrack,
];

/// What a seed run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummary {
    pub users: usize,
    pub trainers: usize,
    pub batches: usize,
}

/// Demo service for managing demo mode
pub struct DemoService {
    data_dir: PathBuf,
}

impl DemoService {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Check if demo mode is currently enabled
    pub fn is_enabled(&self) -> Result<bool> {
        Ok(Config::load(&self.data_dir)?.demo_mode)
    }

    /// Switch to a freshly seeded demo database
    pub fn enable(&self, now: DateTime<Utc>) -> Result<DemoSummary> {
        self.remove_demo_db()?;

        let mut config = Config::load(&self.data_dir).unwrap_or_default();
        config.enable_demo_mode();
        config.save(&self.data_dir)?;

        let db = DuckDbStore::open(&self.data_dir.join(DEMO_DB))
            .context("creating demo database")?;
        let summary = seed(&CollectionStore::new(Arc::new(db)), now)?;
        tracing::debug!(users = summary.users, "seeded demo database");
        Ok(summary)
    }

    /// Switch back to the real database, optionally deleting the demo one
    pub fn disable(&self, clean: bool) -> Result<()> {
        let mut config = Config::load(&self.data_dir).unwrap_or_default();
        config.disable_demo_mode();
        config.save(&self.data_dir)?;

        if clean {
            self.remove_demo_db()?;
        }
        Ok(())
    }

    fn remove_demo_db(&self) -> Result<()> {
        for name in [DEMO_DB.to_string(), format!("{DEMO_DB}.wal")] {
            let path = self.data_dir.join(name);
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("removing {}", path.display()))?;
            }
        }
        Ok(())
    }
}

/// Replace members, trainers and batches with the sample roster
///
/// The roster is the same on every run for a given `now`.
pub fn seed(store: &CollectionStore, now: DateTime<Utc>) -> crate::Result<DemoSummary> {
    store.clear_all_data()?;

    let trainers = TRAINERS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut trainer = Trainer::new(*name);
            trainer.email = format!("trainer{}@demo.test", i + 1);
            trainer.specialization = "Weight loss".to_string();
            trainer
        })
        .collect();
    let trainers = store.add_many(trainers)?;

    let batch = store.add(
        Batch::new("Demo Batch", now - Duration::days(90), now + Duration::days(30)),
        IdStrategy::Random,
    )?;

    let users = sample_users(now);
    let count = users.len();
    for mut user in users {
        user.batch_id = Some(batch.id.clone());
        store.add(
            user,
            IdStrategy::BatchSequential {
                batch_id: batch.id.clone(),
            },
        )?;
    }

    Ok(DemoSummary {
        users: count,
        trainers: trainers.len(),
        batches: 1,
    })
}

/// Twenty members spread over trainers, statuses and program stages
pub fn sample_users(now: DateTime<Utc>) -> Vec<User> {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);

    NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let gender = if index % 2 == 0 { Gender::Male } else { Gender::Female };
            let age = rng.gen_range(25..55);
            let (height, start_weight) = match gender {
                Gender::Male => (rng.gen_range(165.0..185.0), rng.gen_range(75.0..100.0)),
                _ => (rng.gen_range(155.0..175.0), rng.gen_range(65.0..85.0)),
            };
            let goal_weight: f64 = start_weight - rng.gen_range(8.0..20.0);

            // Onboarding, early, mid, acceleration, final phase
            let days_ago: i64 = match index {
                0..=3 => rng.gen_range(3..=7),
                4..=7 => rng.gen_range(8..=21),
                8..=12 => rng.gen_range(22..=45),
                13..=16 => rng.gen_range(46..=70),
                _ => rng.gen_range(71..=90),
            };
            let status = STATUSES[index % STATUSES.len()];
            let height = metrics::round1(height);
            let start = now - Duration::days(days_ago);

            let mut user = User::new(*name);
            user.gender = Some(gender);
            user.age = Some(age);
            user.height = Some(height);
            user.goal_weight = Some(metrics::round1(goal_weight));
            user.program_type = if index % 3 == 0 {
                ProgramType::NinetyDay
            } else {
                ProgramType::SixtyDay
            };
            user.meal_plan = Some(MEAL_PLANS[index % MEAL_PLANS.len()].to_string());
            user.trainer = Some(TRAINERS[index % TRAINERS.len()].to_string());
            user.progress_status = Some(status);
            user.start_date = Some(start);
            user.created_at = Some(start);
            user.logs = sample_logs(&mut rng, start_weight, goal_weight, height, days_ago, status, now);
            user.bmi = metrics::user_bmi(&user).ok();
            user.skipped_classes = user.count_skipped();
            user.notes.push(Note {
                text: match status {
                    ProgressStatus::OnTrack => "Great progress! Keep it up!",
                    ProgressStatus::AtRisk => "Need to increase consistency",
                    ProgressStatus::Struggling => "Requires immediate attention",
                }
                .to_string(),
                date: now - Duration::days(rng.gen_range(0..7)),
            });
            user
        })
        .collect()
}

fn sample_logs(
    rng: &mut StdRng,
    start_weight: f64,
    goal_weight: f64,
    height: f64,
    days_ago: i64,
    status: ProgressStatus,
    now: DateTime<Utc>,
) -> Vec<LogEntry> {
    // Log spacing, share of the expected loss, attendance and size-reduction odds
    let (step, pace, attend_p, reduce_p) = match status {
        ProgressStatus::OnTrack => (1, 0.9, 0.9, 0.8),
        ProgressStatus::AtRisk => (2, 0.6, 0.7, 0.5),
        ProgressStatus::Struggling => (4, 0.3, 0.5, 0.2),
    };
    let food = vec![
        FoodItem::new("Oats with milk", 250, "08:00 AM"),
        FoodItem::new("Banana", 105, "10:30 AM"),
        FoodItem::new("Rice and dal", 350, "01:00 PM"),
        FoodItem::new("Apple", 95, "04:00 PM"),
        FoodItem::new("Roti and vegetables", 300, "08:00 PM"),
    ];

    (0..=days_ago)
        .step_by(step)
        .map(|i| {
            let progress = i as f64 / days_ago as f64;
            let weight = metrics::round1(start_weight - (start_weight - goal_weight) * progress * pace);

            let mut log = LogEntry::new(now - Duration::days(days_ago - i));
            log.weight = Some(weight);
            log.bmi = metrics::bmi(weight, height).ok();
            log.meals = match i % 3 {
                0 => meals("Oats with fruits", "Rice and dal", "Roti and vegetables"),
                1 => meals("Eggs and toast", "Chicken salad", "Grilled fish"),
                _ => meals("Smoothie bowl", "Quinoa bowl", "Soup and salad"),
            };
            log.set_food_intake(food.clone());
            log.attended = rng.gen_bool(attend_p);
            log.size_reduced = rng.gen_bool(reduce_p);
            log
        })
        .collect()
}

fn meals(breakfast: &str, lunch: &str, dinner: &str) -> Meals {
    Meals {
        breakfast: breakfast.to_string(),
        lunch: lunch.to_string(),
        dinner: dinner.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::AppContext;
    use crate::services::scope;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sample_users_are_deterministic() {
        assert_eq!(sample_users(now()), sample_users(now()));
    }

    #[test]
    fn test_sample_roster_shape() {
        let users = sample_users(now());
        assert_eq!(users.len(), 20);
        for status in ProgressStatus::ALL {
            assert!(users.iter().any(|u| u.progress_status == Some(status)));
        }
        for trainer in TRAINERS {
            assert_eq!(
                users.iter().filter(|u| u.trainer.as_deref() == Some(trainer)).count(),
                5
            );
        }
        assert!(users.iter().all(|u| !u.logs.is_empty() && u.bmi.is_some()));
    }

    #[test]
    fn test_seed_replaces_roster() {
        let store = CollectionStore::new(Arc::new(MemoryStore::new()));
        store.add(User::new("Existing"), IdStrategy::Random).unwrap();

        let summary = seed(&store, now()).unwrap();
        assert_eq!(summary.users, 20);

        let users: Vec<User> = store.get_all().unwrap();
        assert_eq!(users.len(), 20);
        assert_eq!(users[0].id, "demo_batch_user_001");
        assert_eq!(scope::scope_users(users, &AppContext::admin()).len(), 20);
    }

    #[test]
    fn test_enable_and_disable() {
        let dir = TempDir::new().unwrap();
        let demo = DemoService::new(dir.path());
        assert!(!demo.is_enabled().unwrap());

        demo.enable(now()).unwrap();
        assert!(demo.is_enabled().unwrap());
        assert!(dir.path().join(DEMO_DB).exists());

        demo.disable(true).unwrap();
        assert!(!demo.is_enabled().unwrap());
        assert!(!dir.path().join(DEMO_DB).exists());
    }
}
