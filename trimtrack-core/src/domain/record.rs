//! Collection names and the traits that bind a record type to its collection

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Every persisted collection, one storage key each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Trainers,
    Batches,
    Exercises,
    ExerciseGroups,
    WeeklyAssignments,
    BatchAssignments,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Trainers,
        Collection::Batches,
        Collection::Exercises,
        Collection::ExerciseGroups,
        Collection::WeeklyAssignments,
        Collection::BatchAssignments,
    ];

    /// Storage key, compatible with data exported from the browser app
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "weightloss_users",
            Collection::Trainers => "weightloss_trainers",
            Collection::Batches => "weightloss_batches",
            Collection::Exercises => "weightloss_exercises",
            Collection::ExerciseGroups => "weightloss_exercise_groups",
            Collection::WeeklyAssignments => "weightloss_weekly_assignments",
            Collection::BatchAssignments => "weightloss_batch_assignments",
        }
    }

    /// Short name for messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Users => "user",
            Collection::Trainers => "trainer",
            Collection::Batches => "batch",
            Collection::Exercises => "exercise",
            Collection::ExerciseGroups => "exercise group",
            Collection::WeeklyAssignments => "weekly assignment",
            Collection::BatchAssignments => "batch assignment",
        }
    }

    /// Prefix for randomly generated ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Collection::Users => "user",
            Collection::Trainers => "trainer",
            Collection::Batches => "batch",
            Collection::Exercises => "ex",
            Collection::ExerciseGroups => "group",
            Collection::WeeklyAssignments => "assign",
            Collection::BatchAssignments => "batch_assign",
        }
    }
}

/// Scalar keys outside the collections
pub mod keys {
    pub const ACTIVE_BATCH_ID: &str = "activeBatchId";
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    pub const USER_ROLE: &str = "userRole";
    pub const CURRENT_USER: &str = "currentUser";
    /// Undo snapshot of the most recent attendance mark
    pub const LAST_ATTENDANCE_MARK: &str = "trimtrack_lastAttendanceMark";
}

/// Whole non-negative number from a loosely typed form value
///
/// Forms stored `parseInt` results, so a cleared field arrives as `null`
/// (from `NaN`), and older records may hold numeric strings or fractions.
pub(crate) fn loose_u32(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) {
        Some(n.trunc() as u32)
    } else {
        None
    }
}

/// Serde adapter: a count that reads anything unusable as 0
pub(crate) fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let raw: Option<Value> = Option::deserialize(d)?;
    Ok(raw.as_ref().and_then(loose_u32).unwrap_or_default())
}

/// A type persisted as an element of one collection
pub trait Stored: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

/// A stored type addressed by a string id
pub trait Record: Stored {
    fn id(&self) -> &str;

    /// Batch this record belongs to, if the type is batch-scoped
    fn batch_id(&self) -> Option<&str> {
        None
    }
}
