//! Logs command - view and manage the event log

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;

use super::{confirm, get_trimtrack_dir, print_json};
use crate::output;
use trimtrack_core::services::{EntryPoint, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days (0 deletes everything)
        #[arg(long, default_value = "30")]
        older_than_days: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show log statistics and database path
    Stats,
}

fn get_logging_service() -> Result<LoggingService> {
    let dir = get_trimtrack_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?)
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: Option<LogsCommands>, json: bool) -> Result<()> {
    let service = get_logging_service()?;

    match command.unwrap_or(LogsCommands::List {
        limit: 50,
        errors: false,
    }) {
        LogsCommands::List { limit, errors } => {
            let entries = if errors {
                service.get_errors(limit)?
            } else {
                service.get_recent(limit)?
            };

            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Entry", "Event", "Command", "Error"]);
            for entry in entries {
                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.entry_point,
                    entry.event,
                    entry.command.unwrap_or_default(),
                    entry
                        .error_message
                        .map(|m| m.red().to_string())
                        .unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }

        LogsCommands::Clear {
            older_than_days,
            force,
        } => {
            let prompt = if older_than_days <= 0 {
                "Delete all log entries?".to_string()
            } else {
                format!("Delete logs older than {older_than_days} days?")
            };
            if !confirm(&prompt, force || json)? {
                println!("Cancelled.");
                return Ok(());
            }

            let deleted = if older_than_days <= 0 {
                service.clear()?
            } else {
                let cutoff = Utc::now() - Duration::days(older_than_days);
                service.delete_before(cutoff.timestamp_millis())?
            };

            if json {
                return print_json(&serde_json::json!({ "deleted": deleted }));
            }
            println!("Deleted {deleted} log entries");
        }

        LogsCommands::Stats => {
            let stats = service.stats()?;
            let db_path = service.db_path().to_path_buf();
            let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                return print_json(&serde_json::json!({
                    "totalEntries": stats.total,
                    "errorCount": stats.errors,
                    "topCommands": stats.top_commands,
                    "databasePath": db_path.to_string_lossy(),
                    "databaseSizeBytes": size_bytes,
                }));
            }

            println!("{}", "Log Statistics".bold());
            println!("  Total entries: {}", stats.total);
            println!("  Errors: {}", stats.errors);
            println!("  Database: {}", db_path.display());
            println!("  Size: {size_bytes} bytes");
            if !stats.top_commands.is_empty() {
                println!("  Top commands:");
                for (command, n) in &stats.top_commands {
                    println!("    {command} ({n})");
                }
            }
        }
    }

    Ok(())
}
