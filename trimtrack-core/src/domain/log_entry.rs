//! Daily log domain model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dates;
use super::record::lenient_u32;

/// The three named meals of a day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub dinner: String,
}

/// One eaten item with its calories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub item: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub calories: u32,
    #[serde(default)]
    pub time: String,
}

impl FoodItem {
    pub fn new(item: impl Into<String>, calories: u32, time: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            calories,
            time: time.into(),
        }
    }
}

/// One day's record for a member: weight, meals, attendance and food detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(with = "dates::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Null when the member has no height on file
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub meals: Meals,
    #[serde(default)]
    pub food_intake: Vec<FoodItem>,
    #[serde(default)]
    pub attended: bool,
    #[serde(default)]
    pub size_reduced: bool,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_calories: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// Create an entry for `date` with nothing recorded yet
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            weight: None,
            bmi: None,
            meals: Meals::default(),
            food_intake: Vec::new(),
            attended: false,
            size_reduced: false,
            total_calories: 0,
            extra: Map::new(),
        }
    }

    /// Calendar day (UTC) this entry belongs to
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Sum of the food item calories
    pub fn sum_food_calories(&self) -> u32 {
        self.food_intake.iter().map(|f| f.calories).sum()
    }

    /// Replace the food list and keep `total_calories` in step
    pub fn set_food_intake(&mut self, items: Vec<FoodItem>) {
        self.food_intake = items;
        self.total_calories = self.sum_food_calories();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_legacy_entry() {
        let raw = r#"{
            "date": "2025-01-15T08:00:00.000Z",
            "weight": 82.4,
            "bmi": 26.9,
            "meals": {"breakfast": "Oats", "lunch": "Rice and dal", "dinner": ""},
            "foodIntake": [{"item": "Banana", "calories": 105, "time": "10:30 AM"}],
            "attended": true,
            "sizeReduced": false,
            "totalCalories": 105
        }"#;
        let entry: LogEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.weight, Some(82.4));
        assert_eq!(entry.day(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(entry.food_intake.len(), 1);
        assert!(entry.attended);
        assert!(entry.extra.is_empty());
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let entry: LogEntry =
            serde_json::from_str(r#"{"date": "2025-01-15T08:00:00.000Z", "weight": 80}"#).unwrap();
        assert!(!entry.attended);
        assert!(!entry.size_reduced);
        assert_eq!(entry.total_calories, 0);
    }

    #[test]
    fn test_null_calories_do_not_reject_entry() {
        let raw = r#"{
            "date": "2025-01-15T08:00:00.000Z",
            "foodIntake": [
                {"item": "Mystery snack", "calories": null, "time": ""},
                {"item": "Apple", "calories": "95"}
            ],
            "totalCalories": null
        }"#;
        let entry: LogEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.food_intake[0].calories, 0);
        assert_eq!(entry.food_intake[1].calories, 95);
        assert_eq!(entry.total_calories, 0);
    }

    #[test]
    fn test_set_food_intake_updates_total() {
        let mut entry = LogEntry::new(Utc::now());
        entry.set_food_intake(vec![
            FoodItem::new("Oats with milk", 250, "08:00 AM"),
            FoodItem::new("Apple", 95, "04:00 PM"),
        ]);
        assert_eq!(entry.total_calories, 345);
    }
}
