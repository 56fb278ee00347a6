//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod batch;
pub mod dates;
mod exercise;
mod log_entry;
pub mod record;
pub mod result;
mod session;
mod trainer;
mod user;

pub use batch::{Batch, BatchStatus};
pub use exercise::{BatchAssignment, Exercise, ExerciseGroup, WeeklyAssignment};
pub use log_entry::{FoodItem, LogEntry, Meals};
pub use record::{Collection, Record, Stored};
pub use session::{AppContext, Identity, Role};
pub use trainer::Trainer;
pub use user::{Gender, NewUser, Note, ProgramType, ProgressStatus, User, ValidNewUser};
