//! Acting identity and the application context passed to scoping filters

use serde::{Deserialize, Serialize};

/// Role of whoever is operating the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Trainer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Trainer => "trainer",
        }
    }
}

/// The acting identity, stored as the `currentUser` JSON value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            role: Role::Admin,
            ..Default::default()
        }
    }

    pub fn trainer(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            role: Role::Trainer,
            ..Default::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("unknown")
    }
}

/// Explicit replacement for the process-wide scope selectors
///
/// Built once per invocation (usually from storage by `SessionService`) and
/// handed to every scoped read, so tests can construct any context directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppContext {
    pub active_batch_id: Option<String>,
    pub identity: Identity,
}

impl AppContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            active_batch_id: None,
            identity,
        }
    }

    /// Unscoped admin context
    pub fn admin() -> Self {
        Self::new(Identity::admin("admin"))
    }

    pub fn with_active_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.active_batch_id = Some(batch_id.into());
        self
    }
}
