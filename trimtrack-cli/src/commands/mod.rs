//! CLI command implementations

pub mod attendance;
pub mod batches;
pub mod calc;
pub mod demo;
pub mod exercises;
pub mod import;
pub mod logs;
pub mod report;
pub mod session;
pub mod status;
pub mod trainers;
pub mod users;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use dialoguer::Confirm;
use serde::Serialize;
use serde_json::{Map, Value};
use trimtrack_core::services::{EntryPoint, LogEvent, LoggingService};
use trimtrack_core::TrimtrackContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let dir = get_trimtrack_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "event log write failed");
        }
    }
}

/// Data directory from `TRIMTRACK_DIR`, else `~/.trimtrack`
pub fn get_trimtrack_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TRIMTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".trimtrack"))
        .ok_or_else(|| anyhow!("Could not find home directory; set TRIMTRACK_DIR"))
}

/// Open the context for this invocation
pub fn get_context() -> Result<TrimtrackContext> {
    let dir = get_trimtrack_dir()?;
    TrimtrackContext::new(&dir).context("Failed to initialize trimtrack context")
}

/// Ask before a destructive change unless `force` is set
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD`, or today (UTC) when absent
pub fn parse_day(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD")),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Build a patch object from `key=value` pairs
///
/// Values that parse as JSON keep their type (`age=31`, `tags=["a"]`),
/// anything else is stored as a string.
pub fn parse_patch(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut patch = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got '{pair}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("empty key in '{pair}'"));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        patch.insert(key.to_string(), value);
    }
    if patch.is_empty() {
        return Err(anyhow!("nothing to change; pass one or more key=value pairs"));
    }
    Ok(patch)
}
