//! Member domain model
//!
//! A `User` is a program member being tracked, not a person who signs in.
//! Trainer association is by name (free text), batch association by id;
//! both are soft references resolved at read time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dates;
use super::log_entry::LogEntry;
use super::record::{lenient_u32, Collection, Record, Stored};
use super::result::{Error, Result};

/// Program length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramType {
    #[default]
    #[serde(rename = "60-day")]
    SixtyDay,
    #[serde(rename = "90-day")]
    NinetyDay,
}

impl ProgramType {
    pub fn total_days(&self) -> u32 {
        match self {
            ProgramType::SixtyDay => 60,
            ProgramType::NinetyDay => 90,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::SixtyDay => "60-day",
            ProgramType::NinetyDay => "90-day",
        }
    }
}

impl std::str::FromStr for ProgramType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "60" | "60-day" => Ok(ProgramType::SixtyDay),
            "90" | "90-day" => Ok(ProgramType::NinetyDay),
            other => Err(Error::validation(format!("unknown program type: {other}"))),
        }
    }
}

/// Trainer-assigned health indicator; never derived from logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressStatus {
    OnTrack,
    AtRisk,
    Struggling,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 3] = [
        ProgressStatus::OnTrack,
        ProgressStatus::AtRisk,
        ProgressStatus::Struggling,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::OnTrack => "On Track",
            ProgressStatus::AtRisk => "At Risk",
            ProgressStatus::Struggling => "Struggling",
        }
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "ontrack" => Ok(ProgressStatus::OnTrack),
            "atrisk" => Ok(ProgressStatus::AtRisk),
            "struggling" => Ok(ProgressStatus::Struggling),
            other => Err(Error::validation(format!("unknown progress status: {other}"))),
        }
    }
}

/// Gender as used by the BMR formula
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    /// Anything else on file; calorie targets use the female constant
    #[serde(other)]
    Unspecified,
}

impl std::str::FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(Error::validation(format!("unknown gender: {other}"))),
        }
    }
}

/// Free-text trainer note, append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    #[serde(with = "dates::timestamp")]
    pub date: DateTime<Utc>,
}

/// A program member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "dates::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub batch_id: Option<String>,
    /// Trainer name; matched against `Trainer::name`
    #[serde(
        default,
        deserialize_with = "dates::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub trainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Centimetres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_weight: Option<f64>,
    #[serde(default)]
    pub program_type: ProgramType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<String>,
    /// Memo of the latest log's BMI; recomputed on every log write
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_status: Option<ProgressStatus>,
    /// Memo of the number of non-attended logs; recomputed on every log write
    #[serde(default, deserialize_with = "lenient_u32")]
    pub skipped_classes: u32,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for User {
    const COLLECTION: Collection = Collection::Users;
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref()
    }
}

impl User {
    /// Create a member with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            batch_id: None,
            trainer: None,
            gender: None,
            age: None,
            height: None,
            goal_weight: None,
            program_type: ProgramType::default(),
            meal_plan: None,
            bmi: None,
            progress_status: None,
            skipped_classes: 0,
            start_date: None,
            created_at: None,
            logs: Vec::new(),
            notes: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Program start; falls back to the creation time for older records
    pub fn program_start(&self) -> Option<DateTime<Utc>> {
        self.start_date.or(self.created_at)
    }

    /// Weight from the first log with a weight (insertion order)
    pub fn starting_weight(&self) -> Option<f64> {
        self.logs.iter().find_map(|l| l.weight)
    }

    /// Weight from the last log with a weight (insertion order)
    pub fn current_weight(&self) -> Option<f64> {
        self.logs.iter().rev().find_map(|l| l.weight)
    }

    pub fn latest_log(&self) -> Option<&LogEntry> {
        self.logs.last()
    }

    /// The entry recorded for a calendar day, if any
    pub fn log_for_day(&self, day: NaiveDate) -> Option<&LogEntry> {
        self.logs.iter().find(|l| l.day() == day)
    }

    pub fn log_for_day_mut(&mut self, day: NaiveDate) -> Option<&mut LogEntry> {
        self.logs.iter_mut().find(|l| l.day() == day)
    }

    /// Count of logs without attendance
    pub fn count_skipped(&self) -> u32 {
        self.logs.iter().filter(|l| !l.attended).count() as u32
    }

    /// Validate member data before a write
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name is required"));
        }
        if let Some(h) = self.height {
            if !(h.is_finite() && h > 0.0) {
                return Err(Error::validation("height must be a positive number"));
            }
        }
        if let Some(w) = self.goal_weight {
            if !(w.is_finite() && w > 0.0) {
                return Err(Error::validation("goal weight must be a positive number"));
            }
        }
        Ok(())
    }
}

/// Add-member form; everything optional so missing fields are reported
/// instead of failing to parse
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub goal_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub program_type: Option<ProgramType>,
    pub meal_plan: Option<String>,
    pub trainer: Option<String>,
    pub batch_id: Option<String>,
}

/// A `NewUser` whose required fields are present
#[derive(Debug, Clone)]
pub struct ValidNewUser {
    pub name: String,
    pub height: f64,
    pub goal_weight: f64,
    pub current_weight: f64,
    pub form: NewUser,
}

impl NewUser {
    /// Check required fields (name, current weight, height, goal weight)
    pub fn validate(self) -> Result<ValidNewUser> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation("name is required"))?
            .to_string();
        let current_weight = positive(self.current_weight, "current weight")?;
        let height = positive(self.height, "height")?;
        let goal_weight = positive(self.goal_weight, "goal weight")?;

        Ok(ValidNewUser {
            name,
            height,
            goal_weight,
            current_weight,
            form: self,
        })
    }
}

fn positive(value: Option<f64>, field: &str) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(_) => Err(Error::validation(format!("{field} must be a positive number"))),
        None => Err(Error::validation(format!("{field} is required"))),
    }
}
