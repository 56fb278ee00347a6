//! Trainer domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dates;
use super::record::{Collection, Record, Stored};
use super::result::{Error, Result};

/// A trainer who owns members by name
///
/// Note: `password` is kept as stored plaintext for compatibility with
/// existing data. Nothing in this crate checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub specialization: String,
    #[serde(
        default,
        with = "dates::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stored for Trainer {
    const COLLECTION: Collection = Collection::Trainers;
}

impl Record for Trainer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Trainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            password: None,
            specialization: String::new(),
            created_at: None,
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("trainer name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainer_keeps_assigned_users_field() {
        let raw = r#"{"id": "trainer_1", "name": "Trainer A", "email": "a@gym.test",
                      "phone": "", "password": "pw", "specialization": "HIIT",
                      "assignedUsers": []}"#;
        let trainer: Trainer = serde_json::from_str(raw).unwrap();
        assert_eq!(trainer.name, "Trainer A");
        assert!(trainer.extra.contains_key("assignedUsers"));
    }

    #[test]
    fn test_trainer_validation() {
        let mut trainer = Trainer::new("Trainer A");
        assert!(trainer.validate().is_ok());
        trainer.name = "  ".into();
        assert!(trainer.validate().is_err());
    }
}
