//! Import service - browser storage dumps in and out
//!
//! A dump is one JSON object mapping storage keys to values. Values may be
//! the raw stored string (what `localStorage` holds) or already-parsed
//! JSON; both are accepted. Only keys this application owns are imported.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::record::keys;
use crate::domain::Collection;
use crate::ports::KeyValueStore;

const SCALAR_KEYS: [&str; 4] = [
    keys::ACTIVE_BATCH_ID,
    keys::IS_AUTHENTICATED,
    keys::USER_ROLE,
    keys::CURRENT_USER,
];

/// How an import treats keys already in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Overwrite the keys present in the dump, keep the rest
    #[default]
    Merge,
    /// Remove every owned key first
    Replace,
}

/// Import options
#[derive(Debug, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Validate and report without writing
    pub preview_only: bool,
}

/// Outcome of an import
#[derive(Debug, Default, Serialize)]
pub struct ImportResult {
    /// Keys written, with the record count for collections
    pub imported: BTreeMap<String, Option<usize>>,
    /// Keys skipped, with the reason
    pub skipped: BTreeMap<String, String>,
    pub preview: bool,
}

/// Import service for storage dumps
pub struct ImportService {
    store: Arc<dyn KeyValueStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn import_file(&self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        self.import_str(&text, options)
    }

    /// Import a dump
    ///
    /// Collection keys must hold a JSON array; anything else is skipped so
    /// a bad dump cannot corrupt a collection. Unknown keys are skipped.
    pub fn import_str(&self, text: &str, options: &ImportOptions) -> Result<ImportResult> {
        let dump: Value = serde_json::from_str(text).context("dump is not valid JSON")?;
        let Value::Object(dump) = dump else {
            bail!("dump must be a JSON object of storage keys");
        };

        let mut result = ImportResult {
            preview: options.preview_only,
            ..Default::default()
        };
        let mut writes = Vec::new();

        for (key, value) in dump {
            match prepare(&key, value) {
                Ok((stored, count)) => {
                    result.imported.insert(key.clone(), count);
                    writes.push((key, stored));
                }
                Err(reason) => {
                    tracing::warn!(key = %key, reason = %reason, "skipping dump entry");
                    result.skipped.insert(key, reason);
                }
            }
        }

        if options.preview_only {
            return Ok(result);
        }

        if options.mode == ImportMode::Replace {
            for key in owned_keys() {
                self.store.remove(key)?;
            }
        }
        for (key, stored) in &writes {
            self.store
                .set(key, stored)
                .with_context(|| format!("writing {key}"))?;
        }
        tracing::debug!(keys = writes.len(), "imported storage dump");
        Ok(result)
    }

    /// Every owned key in the store, collections as parsed JSON and
    /// scalars as stored strings
    pub fn export(&self) -> Result<Map<String, Value>> {
        let mut dump = Map::new();
        for key in self.store.keys()? {
            if !owned_keys().any(|k| k == key) {
                continue;
            }
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            let value = if is_collection_key(&key) || key == keys::CURRENT_USER {
                serde_json::from_str(&raw).unwrap_or(Value::String(raw))
            } else {
                Value::String(raw)
            };
            dump.insert(key, value);
        }
        Ok(dump)
    }

    pub fn export_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Value::Object(self.export()?))?)
    }
}

fn owned_keys() -> impl Iterator<Item = &'static str> {
    Collection::ALL
        .into_iter()
        .map(|c| c.key())
        .chain(SCALAR_KEYS)
}

fn is_collection_key(key: &str) -> bool {
    Collection::ALL.iter().any(|c| c.key() == key)
}

/// The string to store for one dump entry, plus its record count
fn prepare(key: &str, value: Value) -> std::result::Result<(String, Option<usize>), String> {
    if is_collection_key(key) {
        let parsed = match value {
            Value::String(text) => serde_json::from_str(&text)
                .map_err(|e| format!("stored text is not JSON: {e}"))?,
            other => other,
        };
        let Value::Array(items) = &parsed else {
            return Err("collection is not a JSON array".to_string());
        };
        let count = items.len();
        return Ok((parsed.to_string(), Some(count)));
    }

    if SCALAR_KEYS.contains(&key) {
        let stored = match value {
            Value::String(text) => text,
            Value::Null => return Err("null value".to_string()),
            other => other.to_string(),
        };
        return Ok((stored, None));
    }

    Err("not a key this application uses".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{AppContext, User};
    use crate::services::collection::CollectionStore;
    use crate::services::scope;

    const DUMP: &str = r#"{
        "weightloss_users": "[{\"id\":\"user_1\",\"name\":\"Amit\",\"batchId\":\"batch_1\",\"logs\":[]}]",
        "weightloss_trainers": [{"id": "trainer_1", "name": "Trainer A"}],
        "activeBatchId": "batch_1",
        "isAuthenticated": true,
        "theme": "dark",
        "weightloss_batches": "{oops"
    }"#;

    fn setup() -> (Arc<MemoryStore>, ImportService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), ImportService::new(store))
    }

    #[test]
    fn test_import_accepts_strings_and_values() {
        let (store, import) = setup();
        let result = import.import_str(DUMP, &ImportOptions::default()).unwrap();

        assert_eq!(result.imported.get("weightloss_users"), Some(&Some(1)));
        assert_eq!(result.imported.get("weightloss_trainers"), Some(&Some(1)));
        assert!(result.skipped.contains_key("theme"));
        assert!(result.skipped.contains_key("weightloss_batches"));

        assert_eq!(store.get("isAuthenticated").unwrap().as_deref(), Some("true"));
        let users: Vec<User> = CollectionStore::new(store).get_all().unwrap();
        let scoped = scope::scope_users(users, &AppContext::admin().with_active_batch("batch_1"));
        assert_eq!(scoped.len(), 1);
    }

    #[test]
    fn test_preview_writes_nothing() {
        let (store, import) = setup();
        let options = ImportOptions {
            preview_only: true,
            ..Default::default()
        };
        let result = import.import_str(DUMP, &options).unwrap();
        assert!(result.preview);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_replace_clears_owned_keys() {
        let (store, import) = setup();
        store.set("weightloss_batches", "[]").unwrap();
        store.set("unrelated", "kept").unwrap();

        let options = ImportOptions {
            mode: ImportMode::Replace,
            ..Default::default()
        };
        import.import_str(r#"{"activeBatchId": "batch_2"}"#, &options).unwrap();
        assert_eq!(store.get("weightloss_batches").unwrap(), None);
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_rejects_non_object_dump() {
        let (_, import) = setup();
        assert!(import.import_str("[1, 2]", &ImportOptions::default()).is_err());
    }

    #[test]
    fn test_export_round_trip() {
        let (_, import) = setup();
        import.import_str(DUMP, &ImportOptions::default()).unwrap();
        let exported = import.export_string().unwrap();

        let (store2, import2) = setup();
        let result = import2.import_str(&exported, &ImportOptions::default()).unwrap();
        assert!(result.skipped.is_empty());
        assert_eq!(store2.get("activeBatchId").unwrap().as_deref(), Some("batch_1"));
        assert!(exported.contains("\"name\": \"Amit\""));
    }
}
