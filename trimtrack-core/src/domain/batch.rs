//! Batch (program cohort) domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dates;
use super::record::{Collection, Record, Stored};
use super::result::{Error, Result};

/// Lifecycle of a batch. Only `Active` and `Completed` are normally stored;
/// `Upcoming` and `Ended` come from the date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Active,
    Upcoming,
    Ended,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Upcoming => "upcoming",
            BatchStatus::Ended => "ended",
            BatchStatus::Completed => "completed",
        }
    }
}

/// A cohort of the program with its own date range and roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(with = "dates::timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "dates::timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for Batch {
    const COLLECTION: Collection = Collection::Batches;
}

impl Record for Batch {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Batch {
    pub fn new(name: impl Into<String>, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            start_date,
            end_date,
            description: String::new(),
            status: BatchStatus::Active,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// Status as of `now`: a completed batch stays completed, otherwise the
    /// date range decides
    pub fn effective_status(&self, now: DateTime<Utc>) -> BatchStatus {
        if self.status == BatchStatus::Completed {
            BatchStatus::Completed
        } else if now < self.start_date {
            BatchStatus::Upcoming
        } else if now > self.end_date {
            BatchStatus::Ended
        } else {
            BatchStatus::Active
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("batch name cannot be empty"));
        }
        if self.end_date < self.start_date {
            return Err(Error::validation("batch end date is before its start date"));
        }
        Ok(())
    }
}
