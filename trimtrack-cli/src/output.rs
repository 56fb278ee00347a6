//! Output formatting utilities

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use trimtrack_core::domain::{BatchStatus, ProgressStatus};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn progress_status(status: Option<ProgressStatus>) -> ColoredString {
    match status {
        Some(ProgressStatus::OnTrack) => "On Track".green(),
        Some(ProgressStatus::AtRisk) => "At Risk".yellow(),
        Some(ProgressStatus::Struggling) => "Struggling".red(),
        None => "-".dimmed(),
    }
}

pub fn batch_status(status: BatchStatus) -> ColoredString {
    match status {
        BatchStatus::Active => status.as_str().green(),
        BatchStatus::Upcoming => status.as_str().cyan(),
        BatchStatus::Completed => status.as_str().blue(),
        BatchStatus::Ended => status.as_str().dimmed(),
    }
}

/// `72.5 kg`, or `-`
pub fn kg(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1} kg"))
}

pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// `-` for empty strings
pub fn text(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
