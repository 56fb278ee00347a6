//! Exercise library and workout planning models
//!
//! Groups reference exercises by id and assignments reference groups by id.
//! None of these references are enforced; they may dangle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::dates;
use super::record::{lenient_u32, loose_u32, Collection, Record, Stored};
use super::result::{Error, Result};

/// A single exercise in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub calories_burn: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for Exercise {
    const COLLECTION: Collection = Collection::Exercises;
}

impl Record for Exercise {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Exercise {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category: category.into(),
            difficulty: "beginner".to_string(),
            equipment: "none".to_string(),
            duration: "30s".to_string(),
            reps: String::new(),
            instructions: String::new(),
            target_muscles: Vec::new(),
            calories_burn: 3,
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("exercise name cannot be empty"));
        }
        Ok(())
    }
}

/// A named set of exercises, usually one week's routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseGroup {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(
        default,
        deserialize_with = "lenient_week",
        skip_serializing_if = "Option::is_none"
    )]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub description: String,
    /// Exercise ids
    #[serde(default)]
    pub exercises: Vec<String>,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for ExerciseGroup {
    const COLLECTION: Collection = Collection::ExerciseGroups;
}

impl Record for ExerciseGroup {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ExerciseGroup {
    pub fn new(name: impl Into<String>, exercises: Vec<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            difficulty: "beginner".to_string(),
            week_number: None,
            description: String::new(),
            exercises,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("group name cannot be empty"));
        }
        if self.exercises.is_empty() {
            return Err(Error::validation("a group needs at least one exercise"));
        }
        Ok(())
    }
}

/// Program-wide plan: which group runs in which week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAssignment {
    #[serde(default)]
    pub id: String,
    pub week_number: u32,
    pub group_id: String,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for WeeklyAssignment {
    const COLLECTION: Collection = Collection::WeeklyAssignments;
}

impl Record for WeeklyAssignment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Batch-specific override of the weekly plan, keyed by `(batch_id, week_num)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignment {
    pub batch_id: String,
    pub week_num: u32,
    pub group_id: String,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for BatchAssignment {
    const COLLECTION: Collection = Collection::BatchAssignments;
}

/// Week numbers arrive as numbers, numeric strings, or `""` from forms
fn lenient_week<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<u32>, D::Error> {
    let raw: Option<Value> = Option::deserialize(d)?;
    Ok(raw.as_ref().and_then(loose_u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_week_number_accepts_strings() {
        let group: ExerciseGroup = serde_json::from_str(
            r#"{"id": "group_1", "name": "Week 1", "weekNumber": "3", "exercises": ["ex_1"]}"#,
        )
        .unwrap();
        assert_eq!(group.week_number, Some(3));

        let group: ExerciseGroup =
            serde_json::from_str(r#"{"name": "Loose", "weekNumber": "", "exercises": []}"#).unwrap();
        assert_eq!(group.week_number, None);
    }

    #[test]
    fn test_cleared_calories_read_as_zero() {
        let ex: Exercise =
            serde_json::from_str(r#"{"id": "ex_1", "name": "Plank", "caloriesBurn": null}"#).unwrap();
        assert_eq!(ex.calories_burn, 0);

        let ex: Exercise =
            serde_json::from_str(r#"{"id": "ex_2", "name": "Squats", "caloriesBurn": "6"}"#).unwrap();
        assert_eq!(ex.calories_burn, 6);
    }

    #[test]
    fn test_group_validation() {
        assert!(ExerciseGroup::new("Empty", vec![]).validate().is_err());
        assert!(ExerciseGroup::new("Week 1", vec!["ex_1".into()]).validate().is_ok());
    }

    #[test]
    fn test_batch_assignment_shape() {
        let a: BatchAssignment = serde_json::from_str(
            r#"{"batchId": "batch_1", "weekNum": 2, "groupId": "group_9",
                "assignedAt": "2025-01-02T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(a.week_num, 2);
        assert!(a.assigned_at.is_some());
    }
}
