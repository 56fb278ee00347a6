//! Trainer management

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::result::Result;
use crate::domain::{Trainer, User};
use crate::services::collection::{CollectionStore, IdStrategy};
use crate::services::scope;

/// A trainer with the size of their roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSummary {
    #[serde(flatten)]
    pub trainer: Trainer,
    pub member_count: usize,
}

pub struct TrainerService {
    store: CollectionStore,
}

impl TrainerService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Trainer>> {
        self.store.get_all()
    }

    /// Trainers with member counts, matched by name
    pub fn summaries(&self) -> Result<Vec<TrainerSummary>> {
        let users = self.store.get_all::<User>()?;
        Ok(self
            .list()?
            .into_iter()
            .map(|trainer| {
                let member_count = scope::members_of(&trainer, &users).len();
                TrainerSummary {
                    trainer,
                    member_count,
                }
            })
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Trainer> {
        self.store.require(id)
    }

    pub fn add(&self, trainer: Trainer) -> Result<Trainer> {
        trainer.validate()?;
        self.store.add(trainer, IdStrategy::Random)
    }

    /// Patch a trainer
    ///
    /// Members refer to trainers by name, so a rename leaves them pointing
    /// at the old name; those members then show as unassigned.
    pub fn edit(&self, id: &str, patch: Map<String, Value>) -> Result<Trainer> {
        let before = self.get(id)?;
        let trainer: Trainer = self.store.merged(id, patch)?;
        trainer.validate()?;
        self.store.save(&trainer)?;

        if trainer.name != before.name {
            let users = self.store.get_all::<User>()?;
            let orphaned = scope::members_of(&before, &users).len();
            if orphaned > 0 {
                tracing::warn!(
                    id,
                    orphaned,
                    "trainer renamed; members still reference the old name"
                );
            }
        }
        Ok(trainer)
    }

    /// Members owned by the trainer
    pub fn members(&self, id: &str) -> Result<Vec<User>> {
        let trainer = self.get(id)?;
        let users = self.store.get_all::<User>()?;
        Ok(scope::members_of(&trainer, &users).into_iter().cloned().collect())
    }

    /// Delete a trainer; their members keep the dangling name
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.remove::<Trainer>(id)
    }
}
