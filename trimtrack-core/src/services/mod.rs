//! Service layer - business logic orchestration
//!
//! `collection`, `metrics` and `scope` are the shared engine: storage of
//! the collections, derived figures, and visibility filtering. The feature
//! services on top each cover one area of the dashboard.

pub mod attendance;
pub mod batches;
pub mod collection;
pub mod demo;
pub mod exercises;
pub mod import;
pub mod logging;
pub mod metrics;
pub mod migration;
pub mod reports;
pub mod scope;
mod session;
mod status;
mod trainers;
pub mod users;

pub use attendance::{AttendanceRow, AttendanceService, AttendanceSnapshot, AttendanceStats, DayAttendance};
pub use batches::{BatchService, BatchSummary};
pub use collection::{CollectionStore, IdStrategy};
pub use demo::{DemoService, DemoSummary};
pub use exercises::{ExerciseService, PlannedWeek, ResolvedGroup};
pub use import::{ImportMode, ImportOptions, ImportResult, ImportService};
pub use logging::{EntryPoint, EventRecord, EventStats, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use reports::{CalorieComparison, Overview, ReportService, WeeklyReport};
pub use session::SessionService;
pub use status::{CollectionCount, StatusService, StatusSummary};
pub use trainers::{TrainerService, TrainerSummary};
pub use users::{DailyLog, UserService};
