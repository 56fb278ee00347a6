//! Batch (cohort) management and active-batch selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::record::keys;
use crate::domain::result::{Error, Result};
use crate::domain::{AppContext, Batch, BatchStatus, User};
use crate::services::collection::{CollectionStore, IdStrategy};
use crate::services::scope;

/// A batch with its date-derived status and roster size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    #[serde(flatten)]
    pub batch: Batch,
    pub effective_status: BatchStatus,
    /// Members visible in the caller's context
    pub member_count: usize,
    pub is_active_selection: bool,
}

pub struct BatchService {
    store: CollectionStore,
}

impl BatchService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Batch>> {
        self.store.get_all()
    }

    /// Every batch with status and member count as seen from `ctx`
    ///
    /// Counts go through the shared scoping pipeline with the batch in
    /// question as the active one, so a trainer sees only their members.
    pub fn summaries(&self, ctx: &AppContext, now: DateTime<Utc>) -> Result<Vec<BatchSummary>> {
        let users = self.store.get_all::<User>()?;
        Ok(self
            .list()?
            .into_iter()
            .map(|batch| {
                let batch_ctx = ctx.clone().with_active_batch(batch.id.clone());
                let member_count = scope::scope_users(users.clone(), &batch_ctx).len();
                BatchSummary {
                    effective_status: batch.effective_status(now),
                    is_active_selection: ctx.active_batch_id.as_deref() == Some(batch.id.as_str()),
                    member_count,
                    batch,
                }
            })
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Batch> {
        self.store.require(id)
    }

    pub fn add(&self, batch: Batch) -> Result<Batch> {
        batch.validate()?;
        self.store.add(batch, IdStrategy::Random)
    }

    pub fn edit(&self, id: &str, patch: Map<String, Value>) -> Result<Batch> {
        let batch: Batch = self.store.merged(id, patch)?;
        batch.validate()?;
        self.store.save(&batch)?;
        Ok(batch)
    }

    /// Mark a batch completed regardless of its dates
    pub fn complete(&self, id: &str) -> Result<Batch> {
        let mut patch = Map::new();
        patch.insert("status".to_string(), serde_json::to_value(BatchStatus::Completed)?);
        self.store.update(id, patch)
    }

    /// Delete a batch
    ///
    /// Members keep their `batchId`; it simply no longer resolves. If the
    /// batch was the active selection, the selection is cleared.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.remove::<Batch>(id)?;
        if removed && self.active_batch_id()?.as_deref() == Some(id) {
            self.store.remove_scalar(keys::ACTIVE_BATCH_ID)?;
        }
        Ok(removed)
    }

    pub fn active_batch_id(&self) -> Result<Option<String>> {
        self.store.get_scalar(keys::ACTIVE_BATCH_ID)
    }

    /// Make `id` the active batch for every scoped view
    pub fn activate(&self, id: &str) -> Result<Batch> {
        let batch = self
            .store
            .get::<Batch>(id)?
            .ok_or_else(|| Error::validation(format!("no batch with id '{id}'")))?;
        self.store.set_scalar(keys::ACTIVE_BATCH_ID, &batch.id)?;
        Ok(batch)
    }

    /// Clear the active batch so views show every batch
    pub fn deactivate(&self) -> Result<()> {
        self.store.remove_scalar(keys::ACTIVE_BATCH_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::Identity;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn setup() -> (CollectionStore, BatchService) {
        let store = CollectionStore::new(Arc::new(MemoryStore::new()));
        (store.clone(), BatchService::new(store))
    }

    fn jan() -> Batch {
        Batch::new(
            "January 2025",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_summaries_scope_counts() {
        let (store, batches) = setup();
        let batch = batches.add(jan()).unwrap();
        for (name, trainer) in [("Amit", "Trainer A"), ("Priya", "Trainer B")] {
            let mut user = User::new(name);
            user.batch_id = Some(batch.id.clone());
            user.trainer = Some(trainer.to_string());
            store.add(user, IdStrategy::Random).unwrap();
        }

        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let admin = batches.summaries(&AppContext::admin(), now).unwrap();
        assert_eq!(admin[0].member_count, 2);
        assert_eq!(admin[0].effective_status, BatchStatus::Active);

        let trainer = batches
            .summaries(&AppContext::new(Identity::trainer("Trainer A")), now)
            .unwrap();
        assert_eq!(trainer[0].member_count, 1);
    }

    #[test]
    fn test_activate_and_delete_clears_selection() {
        let (_, batches) = setup();
        let batch = batches.add(jan()).unwrap();
        assert!(batches.activate("batch_missing").is_err());

        batches.activate(&batch.id).unwrap();
        assert_eq!(batches.active_batch_id().unwrap(), Some(batch.id.clone()));

        assert!(batches.delete(&batch.id).unwrap());
        assert_eq!(batches.active_batch_id().unwrap(), None);
    }

    #[test]
    fn test_edit_validates_range() {
        let (_, batches) = setup();
        let batch = batches.add(jan()).unwrap();
        let patch = serde_json::json!({"endDate": "2024-12-01"}).as_object().cloned().unwrap();
        assert!(matches!(batches.edit(&batch.id, patch), Err(Error::Validation(_))));

        let completed = batches.complete(&batch.id).unwrap();
        assert_eq!(completed.status, BatchStatus::Completed);
    }
}
