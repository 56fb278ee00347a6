//! Acting identity and active batch, persisted alongside the data
//!
//! Credentials are never checked here. Logging in as a trainer simply
//! records who is acting so every scoped view can filter by them.

use crate::domain::record::keys;
use crate::domain::result::Result;
use crate::domain::{AppContext, Identity, Role, Trainer};
use crate::services::collection::CollectionStore;

pub struct SessionService {
    store: CollectionStore,
}

impl SessionService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.get_scalar(keys::IS_AUTHENTICATED)?.as_deref() == Some("true"))
    }

    /// Build the context for this invocation
    ///
    /// Without a stored session the operator acts as admin. A stored role
    /// wins over the role inside `currentUser` when the two disagree.
    pub fn context(&self) -> Result<AppContext> {
        let active_batch_id = self.store.get_scalar(keys::ACTIVE_BATCH_ID)?;

        let identity = if self.is_authenticated()? {
            let mut identity = self
                .store
                .get_json::<Identity>(keys::CURRENT_USER)?
                .unwrap_or_default();
            match self.store.get_scalar(keys::USER_ROLE)?.as_deref() {
                Some("trainer") => identity.role = Role::Trainer,
                Some("admin") => identity.role = Role::Admin,
                Some(other) => tracing::warn!(role = other, "ignoring unknown stored role"),
                None => {}
            }
            identity
        } else {
            Identity::admin("admin")
        };

        Ok(AppContext {
            active_batch_id,
            identity,
        })
    }

    pub fn login_as(&self, identity: &Identity) -> Result<()> {
        self.store.set_json(keys::CURRENT_USER, identity)?;
        self.store.set_scalar(keys::USER_ROLE, identity.role.as_str())?;
        self.store.set_scalar(keys::IS_AUTHENTICATED, "true")?;
        tracing::debug!(role = identity.role.as_str(), "session started");
        Ok(())
    }

    /// Act as the trainer with `trainer_id`
    pub fn login_as_trainer(&self, trainer_id: &str) -> Result<Identity> {
        let trainer: Trainer = self.store.require(trainer_id)?;
        let identity = Identity {
            id: Some(trainer.id),
            name: Some(trainer.name),
            email: Some(trainer.email).filter(|e| !e.is_empty()),
            username: None,
            role: Role::Trainer,
        };
        self.login_as(&identity)?;
        Ok(identity)
    }

    /// Forget the acting identity; the active batch selection stays
    pub fn logout(&self) -> Result<()> {
        for key in [keys::CURRENT_USER, keys::USER_ROLE, keys::IS_AUTHENTICATED] {
            self.store.remove_scalar(key)?;
        }
        Ok(())
    }
}
