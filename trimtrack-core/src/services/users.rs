//! Member roster: add, edit, daily logs, notes, status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::result::{Error, Result};
use crate::domain::{
    AppContext, FoodItem, LogEntry, Meals, NewUser, Note, ProgressStatus, User,
};
use crate::services::collection::{CollectionStore, IdStrategy};
use crate::services::{metrics, scope};

/// One day's entry as submitted from the daily log form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub weight: Option<f64>,
    #[serde(default)]
    pub meals: Meals,
    #[serde(default)]
    pub food_intake: Vec<FoodItem>,
    #[serde(default)]
    pub attended: bool,
    #[serde(default)]
    pub size_reduced: bool,
}

/// Member roster operations
pub struct UserService {
    store: CollectionStore,
}

impl UserService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    /// Members visible in `ctx`
    pub fn list(&self, ctx: &AppContext) -> Result<Vec<User>> {
        Ok(scope::scope_users(self.store.get_all::<User>()?, ctx))
    }

    pub fn get(&self, id: &str) -> Result<User> {
        self.store.require(id)
    }

    /// Validate the form and add the member with one seed log entry
    ///
    /// Members in a batch get a batch-sequential id, others a random one.
    pub fn add(&self, form: NewUser, now: DateTime<Utc>) -> Result<User> {
        let valid = form.validate()?;
        let seed_bmi = metrics::bmi(valid.current_weight, valid.height)?;

        let mut seed = LogEntry::new(now);
        seed.weight = Some(valid.current_weight);
        seed.bmi = Some(seed_bmi);
        seed.attended = true;

        let form = valid.form;
        let mut user = User::new(valid.name);
        user.gender = form.gender;
        user.age = form.age;
        user.height = Some(valid.height);
        user.goal_weight = Some(valid.goal_weight);
        user.program_type = form.program_type.unwrap_or_default();
        user.meal_plan = form.meal_plan.filter(|m| !m.trim().is_empty());
        user.trainer = form.trainer.filter(|t| !t.trim().is_empty());
        user.batch_id = form.batch_id.filter(|b| !b.trim().is_empty());
        user.bmi = Some(seed_bmi);
        user.progress_status = Some(ProgressStatus::OnTrack);
        user.start_date = Some(now);
        user.logs.push(seed);
        user.skipped_classes = user.count_skipped();
        user.extra.insert("attendance".to_string(), Value::Array(Vec::new()));

        let strategy = match &user.batch_id {
            Some(batch_id) => IdStrategy::BatchSequential {
                batch_id: batch_id.clone(),
            },
            None => IdStrategy::Random,
        };
        let user = self.store.add(user, strategy)?;
        tracing::debug!(id = %user.id, "added member");
        Ok(user)
    }

    /// Patch profile fields, then refresh the cached BMI
    ///
    /// Nothing is written unless the patched member validates.
    pub fn edit(&self, id: &str, patch: Map<String, Value>) -> Result<User> {
        let mut user: User = self.store.merged(id, patch)?;
        user.validate()?;
        refresh_memos(&mut user);
        self.store.save(&user)?;
        Ok(user)
    }

    /// Record the entry for `day`, replacing any entry already on that day
    pub fn log_day(&self, id: &str, day: NaiveDate, entry: DailyLog) -> Result<User> {
        let mut user = self.get(id)?;
        if let Some(weight) = entry.weight {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(Error::validation("weight must be a positive number"));
            }
        }

        let mut log = LogEntry::new(crate::domain::dates::start_of_day(day));
        log.weight = entry.weight.or_else(|| user.current_weight());
        log.bmi = match (log.weight, user.height) {
            (Some(w), Some(h)) => metrics::bmi(w, h).ok(),
            _ => None,
        };
        log.meals = entry.meals;
        log.attended = entry.attended;
        log.size_reduced = entry.size_reduced;
        log.set_food_intake(entry.food_intake);

        upsert_log(&mut user, log);
        refresh_memos(&mut user);
        self.store.save(&user)?;
        Ok(user)
    }

    /// Append a trainer note
    pub fn add_note(&self, id: &str, text: &str, now: DateTime<Utc>) -> Result<User> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("note text cannot be empty"));
        }
        let mut user = self.get(id)?;
        user.notes.push(Note {
            text: text.to_string(),
            date: now,
        });
        self.store.save(&user)?;
        Ok(user)
    }

    pub fn set_status(&self, id: &str, status: ProgressStatus) -> Result<User> {
        let mut patch = Map::new();
        patch.insert("progressStatus".to_string(), serde_json::to_value(status)?);
        self.store.update(id, patch)
    }

    /// Delete a member; a missing id is logged and reported as `false`
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.remove::<User>(id)
    }
}

/// Replace the entry on the same calendar day, or append. Extra entries on
/// that day are dropped.
pub fn upsert_log(user: &mut User, log: LogEntry) {
    let day = log.day();
    match user.logs.iter().position(|l| l.day() == day) {
        Some(index) => {
            let mut extra = std::mem::take(&mut user.logs[index].extra);
            extra.extend(log.extra.clone());
            user.logs[index] = LogEntry { extra, ..log };
            let mut seen = false;
            user.logs.retain(|l| {
                if l.day() != day {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        }
        None => user.logs.push(log),
    }
}

/// Recompute the cached `bmi` and `skippedClasses` from the logs
pub fn refresh_memos(user: &mut User) {
    user.bmi = metrics::user_bmi(user).ok();
    user.skipped_classes = user.count_skipped();
}
