//! Collection store - named JSON arrays over a key-value medium
//!
//! Each collection is one JSON array stored under one key. Every mutation
//! reads the whole array, changes it, and writes the whole array back.
//! Records are kept as raw JSON between read and write, so elements that do
//! not fit the typed shape (or fields this crate does not know) are written
//! back untouched instead of being dropped.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::dates;
use crate::domain::record::{keys, Collection, Record, Stored};
use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// How `add` assigns an id to a new record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdStrategy {
    /// `{prefix}_{unix_millis}_{9 base36 chars}`, prefix from the collection
    Random,
    /// `{batch_code}_user_{NNN}`: 1 + records already in the batch,
    /// zero-padded, bumped until unused
    BatchSequential { batch_id: String },
}

/// Typed get/add/update/remove over the collections of one store
#[derive(Clone)]
pub struct CollectionStore {
    store: Arc<dyn KeyValueStore>,
}

impl CollectionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying key-value medium
    pub fn medium(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // === Raw access ===

    /// Elements of a collection as raw JSON
    ///
    /// An absent key is an empty collection. So is a value that is not a
    /// JSON array; that case is logged because it means the stored data is
    /// corrupt.
    pub fn raw(&self, collection: Collection) -> Result<Vec<Value>> {
        let Some(text) = self.store.get(collection.key())? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(_) => {
                tracing::warn!(key = collection.key(), "stored collection is not an array, reading as empty");
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!(key = collection.key(), error = %e, "stored collection is corrupt, reading as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Replace a collection with raw JSON elements
    pub fn write_raw(&self, collection: Collection, items: &[Value]) -> Result<()> {
        let text = serde_json::to_string(items)?;
        self.store.set(collection.key(), &text)
    }

    // === Typed reads ===

    /// Every record of `T`'s collection that fits the typed shape
    pub fn get_all<T: Stored>(&self) -> Result<Vec<T>> {
        let items = self.raw(T::COLLECTION)?;
        Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        collection = T::COLLECTION.key(),
                        index,
                        error = %e,
                        "skipping record that does not fit its shape"
                    );
                    None
                }
            })
            .collect())
    }

    /// A single record by id
    pub fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        Ok(self.get_all::<T>()?.into_iter().find(|r| r.id() == id))
    }

    /// Like `get`, but a missing id is `NotFound`
    pub fn require<T: Record>(&self, id: &str) -> Result<T> {
        self.get(id)?.ok_or_else(|| {
            Error::not_found(format!("{} '{}'", T::COLLECTION.label(), id))
        })
    }

    // === Mutations ===

    /// Assign an id, stamp `createdAt` if absent, append and write back
    ///
    /// Returns the record as stored.
    pub fn add<T: Record>(&self, record: T, strategy: IdStrategy) -> Result<T> {
        let mut items = self.raw(T::COLLECTION)?;

        let id = match &strategy {
            IdStrategy::Random => random_id(T::COLLECTION.id_prefix()),
            IdStrategy::BatchSequential { batch_id } => self.batch_sequential_id(&items, batch_id)?,
        };

        let mut value = to_object(&record)?;
        value.insert("id".to_string(), Value::String(id));
        let created_missing = value.get("createdAt").map_or(true, Value::is_null);
        if created_missing {
            value.insert(
                "createdAt".to_string(),
                Value::String(dates::format_timestamp(&Utc::now())),
            );
        }

        let value = Value::Object(value);
        let stored: T = serde_json::from_value(value.clone())?;
        items.push(value);
        self.write_raw(T::COLLECTION, &items)?;

        tracing::debug!(collection = T::COLLECTION.key(), id = stored.id(), "added record");
        Ok(stored)
    }

    /// Append several records with random ids in one write
    pub fn add_many<T: Record>(&self, records: Vec<T>) -> Result<Vec<T>> {
        let mut items = self.raw(T::COLLECTION)?;
        let now = dates::format_timestamp(&Utc::now());
        let mut added = Vec::with_capacity(records.len());

        for record in records {
            let mut value = to_object(&record)?;
            value.insert(
                "id".to_string(),
                Value::String(random_id(T::COLLECTION.id_prefix())),
            );
            if value.get("createdAt").map_or(true, Value::is_null) {
                value.insert("createdAt".to_string(), Value::String(now.clone()));
            }
            let value = Value::Object(value);
            added.push(serde_json::from_value::<T>(value.clone())?);
            items.push(value);
        }

        self.write_raw(T::COLLECTION, &items)?;
        Ok(added)
    }

    /// Shallow-merge `patch` into the record with `id`, re-validate the
    /// merged record against its shape, write back and return it
    ///
    /// The id itself cannot be patched.
    pub fn update<T: Record>(&self, id: &str, patch: Map<String, Value>) -> Result<T> {
        let mut items = self.raw(T::COLLECTION)?;
        let (index, merged, record) = merge_at::<T>(&items, id, patch)?;
        items[index] = merged;
        self.write_raw(T::COLLECTION, &items)?;
        Ok(record)
    }

    /// The record `update` would produce, without writing it
    ///
    /// For callers that check more than the shape before committing.
    pub fn merged<T: Record>(&self, id: &str, patch: Map<String, Value>) -> Result<T> {
        let items = self.raw(T::COLLECTION)?;
        let (_, _, record) = merge_at::<T>(&items, id, patch)?;
        Ok(record)
    }

    /// Replace the stored record that has the same id
    pub fn save<T: Record>(&self, record: &T) -> Result<()> {
        let mut items = self.raw(T::COLLECTION)?;
        let index = find_index(&items, record.id()).ok_or_else(|| {
            Error::not_found(format!("{} '{}'", T::COLLECTION.label(), record.id()))
        })?;
        items[index] = Value::Object(to_object(record)?);
        self.write_raw(T::COLLECTION, &items)
    }

    /// Replace several stored records by id in one write
    ///
    /// Records whose id is not stored are skipped with a diagnostic.
    pub fn save_many<T: Record>(&self, records: &[T]) -> Result<usize> {
        let mut items = self.raw(T::COLLECTION)?;
        let mut saved = 0;
        for record in records {
            match find_index(&items, record.id()) {
                Some(index) => {
                    items[index] = Value::Object(to_object(record)?);
                    saved += 1;
                }
                None => {
                    tracing::warn!(collection = T::COLLECTION.key(), id = record.id(), "save: no record with this id");
                }
            }
        }
        if saved > 0 {
            self.write_raw(T::COLLECTION, &items)?;
        }
        Ok(saved)
    }

    /// Remove the record with `id`
    ///
    /// A missing id is a stale reference held by the caller: it is logged,
    /// nothing is written, and `Ok(false)` is returned. Nothing referencing
    /// the removed record is touched.
    pub fn remove<T: Record>(&self, id: &str) -> Result<bool> {
        let mut items = self.raw(T::COLLECTION)?;
        let before = items.len();
        items.retain(|item| item_id(item) != Some(id));

        if items.len() == before {
            tracing::warn!(collection = T::COLLECTION.key(), id, "remove: no record with this id");
            return Ok(false);
        }

        self.write_raw(T::COLLECTION, &items)?;
        tracing::debug!(collection = T::COLLECTION.key(), id, "removed record");
        Ok(true)
    }

    /// Replace a whole collection
    pub fn put_all<T: Stored>(&self, records: &[T]) -> Result<()> {
        let items = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.write_raw(T::COLLECTION, &items)
    }

    /// Remove a collection's key entirely
    pub fn clear(&self, collection: Collection) -> Result<()> {
        self.store.remove(collection.key())
    }

    /// Remove members, trainers, batches and the active batch selection
    ///
    /// The exercise library and plans are kept.
    pub fn clear_all_data(&self) -> Result<()> {
        for collection in [Collection::Users, Collection::Trainers, Collection::Batches] {
            self.clear(collection)?;
        }
        self.store.remove(keys::LAST_ATTENDANCE_MARK)?;
        self.store.remove(keys::ACTIVE_BATCH_ID)
    }

    // === Scalars ===

    pub fn get_scalar(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key)?.filter(|v| !v.is_empty()))
    }

    pub fn set_scalar(&self, key: &str, value: &str) -> Result<()> {
        self.store.set(key, value)
    }

    pub fn remove_scalar(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }

    /// A scalar holding JSON; unparseable values read as `None`
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.get_scalar(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unparseable stored value");
                Ok(None)
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, &serde_json::to_string(value)?)
    }

    // === Ids ===

    fn batch_sequential_id(&self, items: &[Value], batch_id: &str) -> Result<String> {
        let batch_name = self
            .raw(Collection::Batches)?
            .iter()
            .find(|b| item_id(b) == Some(batch_id))
            .and_then(|b| b.get("name").and_then(Value::as_str).map(str::to_string));
        let code = batch_code(batch_name.as_deref())?;

        let in_batch = items
            .iter()
            .filter(|item| item.get("batchId").and_then(Value::as_str) == Some(batch_id))
            .count();

        let mut n = in_batch + 1;
        loop {
            let candidate = format!("{code}_user_{n:03}");
            if find_index(items, &candidate).is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// `{prefix}_{unix_millis}_{9 base36 chars}`
pub fn random_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Batch name lowercased with whitespace runs replaced by `_`
pub fn batch_code(batch_name: Option<&str>) -> Result<String> {
    let Some(name) = batch_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok("batch".to_string());
    };
    let whitespace = Regex::new(r"\s+").map_err(|e| Error::validation(e.to_string()))?;
    Ok(whitespace.replace_all(&name.to_lowercase(), "_").into_owned())
}

fn merge_at<T: Record>(
    items: &[Value],
    id: &str,
    patch: Map<String, Value>,
) -> Result<(usize, Value, T)> {
    let index = find_index(items, id)
        .ok_or_else(|| Error::not_found(format!("{} '{}'", T::COLLECTION.label(), id)))?;

    let mut merged = match &items[index] {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in patch {
        if key != "id" {
            merged.insert(key, value);
        }
    }
    merged.insert("id".to_string(), Value::String(id.to_string()));

    let merged = Value::Object(merged);
    let record: T = serde_json::from_value(merged.clone()).map_err(|e| {
        Error::validation(format!("invalid {} update: {}", T::COLLECTION.label(), e))
    })?;
    Ok((index, merged, record))
}

fn to_object<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::validation(format!("record is not a JSON object: {other}"))),
    }
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

fn find_index(items: &[Value], id: &str) -> Option<usize> {
    items.iter().position(|item| item_id(item) == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{Batch, Trainer, User};
    use chrono::TimeZone;
    use serde_json::json;

    fn store() -> CollectionStore {
        CollectionStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_random_id_shape() {
        let id = random_id("user");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_batch_code() {
        assert_eq!(batch_code(Some("January  2025 Batch")).unwrap(), "january_2025_batch");
        assert_eq!(batch_code(None).unwrap(), "batch");
        assert_eq!(batch_code(Some("  ")).unwrap(), "batch");
    }

    #[test]
    fn test_add_stamps_id_and_created_at() {
        let store = store();
        let trainer = store.add(Trainer::new("Trainer A"), IdStrategy::Random).unwrap();
        assert!(trainer.id.starts_with("trainer_"));
        assert!(trainer.created_at.is_some());
        assert_eq!(store.get_all::<Trainer>().unwrap().len(), 1);
    }

    #[test]
    fn test_batch_sequential_ids_skip_used_numbers() {
        let store = store();
        let batch = Batch::new(
            "Jan 2025",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        );
        let batch = store.add(batch, IdStrategy::Random).unwrap();
        let strategy = IdStrategy::BatchSequential {
            batch_id: batch.id.clone(),
        };

        let mut first = User::new("A");
        first.batch_id = Some(batch.id.clone());
        let first = store.add(first, strategy.clone()).unwrap();
        assert_eq!(first.id, "jan_2025_user_001");

        let mut second = User::new("B");
        second.batch_id = Some(batch.id.clone());
        let second = store.add(second, strategy.clone()).unwrap();
        assert_eq!(second.id, "jan_2025_user_002");

        // After deleting the first member the count drops back to 1, but 002
        // is taken, so the next id moves past it
        store.remove::<User>(&first.id).unwrap();
        let mut third = User::new("C");
        third.batch_id = Some(batch.id.clone());
        let third = store.add(third, strategy).unwrap();
        assert_eq!(third.id, "jan_2025_user_003");
    }

    #[test]
    fn test_update_merges_and_rejects_bad_shapes() {
        let store = store();
        let user = store.add(User::new("A"), IdStrategy::Random).unwrap();

        let patch = json!({"age": 30}).as_object().cloned().unwrap();
        store.update::<User>(&user.id, patch).unwrap();
        let patch = json!({"mealPlan": "Veg"}).as_object().cloned().unwrap();
        let merged = store.update::<User>(&user.id, patch).unwrap();
        assert_eq!(merged.age, Some(30));
        assert_eq!(merged.meal_plan.as_deref(), Some("Veg"));

        let patch = json!({"age": "thirty"}).as_object().cloned().unwrap();
        let err = store.update::<User>(&user.id, patch).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.get::<User>(&user.id).unwrap().unwrap().age, Some(30));

        let err = store.update::<User>("user_missing", Map::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_corrupt_collection_reads_empty() {
        let medium = Arc::new(MemoryStore::new());
        medium.set(Collection::Users.key(), "{not json").unwrap();
        let store = CollectionStore::new(medium);
        assert!(store.get_all::<User>().unwrap().is_empty());
    }

    #[test]
    fn test_misshapen_records_are_skipped_but_kept() {
        let medium = Arc::new(MemoryStore::new());
        medium
            .set(
                Collection::Trainers.key(),
                r#"[{"id": "trainer_1", "name": "A"}, {"id": "trainer_2"}]"#,
            )
            .unwrap();
        let store = CollectionStore::new(medium.clone());
        assert_eq!(store.get_all::<Trainer>().unwrap().len(), 1);

        store.update::<Trainer>("trainer_1", Map::new()).unwrap();
        assert_eq!(store.raw(Collection::Trainers).unwrap().len(), 2);
    }

    #[test]
    fn test_null_numbers_from_forms_still_read() {
        let medium = Arc::new(MemoryStore::new());
        medium
            .set(
                Collection::Exercises.key(),
                r#"[{"id": "ex_1", "name": "Plank", "category": "Core", "caloriesBurn": null},
                    {"id": "ex_2", "name": "Squats", "category": "Strength", "caloriesBurn": 4}]"#,
            )
            .unwrap();
        medium
            .set(
                Collection::Users.key(),
                r#"[{"id": "user_1", "name": "A", "logs": [{"date": "2025-01-15T08:00:00.000Z",
                    "foodIntake": [{"item": "Tea", "calories": null}], "totalCalories": null}]}]"#,
            )
            .unwrap();
        let store = CollectionStore::new(medium);

        let exercises = store.get_all::<crate::domain::Exercise>().unwrap();
        let ids: Vec<&str> = exercises.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ex_1", "ex_2"]);
        assert_eq!(exercises[0].calories_burn, 0);
        assert_eq!(store.get_all::<User>().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all_data_keeps_exercises() {
        let store = store();
        store.add(User::new("A"), IdStrategy::Random).unwrap();
        store
            .add(crate::domain::Exercise::new("Squats", "Strength"), IdStrategy::Random)
            .unwrap();
        store.set_scalar(keys::ACTIVE_BATCH_ID, "batch_1").unwrap();

        store.clear_all_data().unwrap();
        assert!(store.get_all::<User>().unwrap().is_empty());
        assert_eq!(store.get_all::<crate::domain::Exercise>().unwrap().len(), 1);
        assert_eq!(store.get_scalar(keys::ACTIVE_BATCH_ID).unwrap(), None);
    }
}
