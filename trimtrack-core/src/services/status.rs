//! Status service - record counts and session summary

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{AppContext, Batch, Collection, User};
use crate::services::collection::CollectionStore;
use crate::services::scope;

/// Status service for store summaries
pub struct StatusService {
    store: CollectionStore,
}

impl StatusService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    /// Get overall status summary
    ///
    /// Collection counts are raw element counts, so records that fail to
    /// parse are still counted.
    pub fn get_status(&self, ctx: &AppContext) -> Result<StatusSummary> {
        let mut collections = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            collections.push(CollectionCount {
                key: collection.key().to_string(),
                records: self.store.raw(collection)?.len(),
            });
        }

        let batches: Vec<Batch> = self.store.get_all()?;
        let active_batch = ctx.active_batch_id.as_ref().map(|id| {
            batches
                .iter()
                .find(|b| &b.id == id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| format!("{id} (missing)"))
        });

        let visible_users = scope::scope_users(self.store.get_all::<User>()?, ctx).len();

        Ok(StatusSummary {
            collections,
            visible_users,
            active_batch,
            acting_as: ctx.identity.display_name().to_string(),
            role: ctx.identity.role.as_str().to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub collections: Vec<CollectionCount>,
    /// Members visible in the current context
    pub visible_users: usize,
    pub active_batch: Option<String>,
    pub acting_as: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionCount {
    pub key: String,
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::services::collection::IdStrategy;
    use std::sync::Arc;

    #[test]
    fn test_status_counts_and_dangling_batch() {
        let store = CollectionStore::new(Arc::new(MemoryStore::new()));
        store.add(User::new("Amit"), IdStrategy::Random).unwrap();
        let status = StatusService::new(store);

        let summary = status
            .get_status(&AppContext::admin().with_active_batch("batch_gone"))
            .unwrap();
        assert_eq!(summary.collections[0].records, 1);
        assert_eq!(summary.visible_users, 0);
        assert_eq!(summary.active_batch.as_deref(), Some("batch_gone (missing)"));
        assert_eq!(summary.role, "admin");
    }
}
