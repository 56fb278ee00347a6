//! Trimtrack Core - Business logic for weight-loss program tracking
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, LogEntry, Trainer, Batch, exercises)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore)
//! - **services**: Collection store, metrics, scoping and feature services
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use adapters::DuckDbStore;
use config::Config;
use ports::KeyValueStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{AppContext, Batch, Exercise, ExerciseGroup, Identity, LogEntry, Trainer, User};

/// Main context for Trimtrack operations
///
/// This is the primary entry point for all business logic. It holds
/// the store, configuration, and all services.
pub struct TrimtrackContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: Arc<dyn KeyValueStore>,
    pub collections: CollectionStore,
    pub user_service: UserService,
    pub attendance_service: AttendanceService,
    pub trainer_service: TrainerService,
    pub batch_service: BatchService,
    pub exercise_service: ExerciseService,
    pub report_service: ReportService,
    pub session_service: SessionService,
    pub status_service: StatusService,
    pub import_service: ImportService,
}

impl TrimtrackContext {
    /// Open the database for the configured mode inside `data_dir`
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(data_dir)?;
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("creating {}", data_dir.display()))?;

        let db_path = data_dir.join(config.db_filename());
        let store = DuckDbStore::open(&db_path)
            .with_context(|| format!("opening {}", db_path.display()))?;

        Ok(Self::with_store(config, data_dir, Arc::new(store)))
    }

    /// Build the context over an existing store
    pub fn with_store(config: Config, data_dir: &Path, store: Arc<dyn KeyValueStore>) -> Self {
        let collections = CollectionStore::new(Arc::clone(&store));

        Self {
            user_service: UserService::new(collections.clone()),
            attendance_service: AttendanceService::new(collections.clone()),
            trainer_service: TrainerService::new(collections.clone()),
            batch_service: BatchService::new(collections.clone()),
            exercise_service: ExerciseService::new(collections.clone()),
            report_service: ReportService::new(collections.clone(), config.calories),
            session_service: SessionService::new(collections.clone()),
            status_service: StatusService::new(collections.clone()),
            import_service: ImportService::new(Arc::clone(&store)),
            data_dir: data_dir.to_path_buf(),
            collections,
            store,
            config,
        }
    }

    /// Scope for this invocation, from the stored session
    pub fn app_context(&self) -> Result<AppContext> {
        self.session_service.context()
    }
}
