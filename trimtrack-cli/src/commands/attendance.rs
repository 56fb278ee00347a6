//! Attendance command - mark sessions, daily stats, CSV export

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, parse_day, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum AttendanceCommands {
    /// Mark members present (or absent) for a day
    Mark {
        /// Member ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Mark as absent instead of present
        #[arg(long)]
        absent: bool,
    },
    /// Undo the most recent mark
    Undo,
    /// Attendance for one day over the current scope
    Stats {
        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Export the attendance summary as CSV
    Export {
        /// Output file (default stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: AttendanceCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;

    match command {
        AttendanceCommands::Mark { ids, date, absent } => {
            let day = parse_day(date.as_deref())?;
            let snapshot = ctx.attendance_service.mark_many(&ids, day, !absent)?;
            if json {
                return print_json(&snapshot);
            }
            let unique: HashSet<&String> = ids.iter().collect();
            let skipped = unique.len().saturating_sub(snapshot.previous.len());
            let label = if absent { "absent" } else { "present" };
            output::success(&format!(
                "Marked {} member(s) {} on {}",
                snapshot.previous.len(),
                label,
                day
            ));
            if skipped > 0 {
                output::warning(&format!("{skipped} id(s) not found"));
            }
            println!("{}", "Run 'tt attendance undo' to revert.".dimmed());
        }

        AttendanceCommands::Undo => {
            let undone = ctx.attendance_service.undo_last()?;
            if json {
                let value = undone.map(|(day, restored)| serde_json::json!({ "day": day, "restored": restored }));
                return print_json(&value);
            }
            match undone {
                Some((day, restored)) => {
                    output::success(&format!("Restored {restored} member(s) marked on {day}"))
                }
                None => output::info("Nothing to undo"),
            }
        }

        AttendanceCommands::Stats { date } => {
            let day = parse_day(date.as_deref())?;
            let app = ctx.app_context()?;
            let list = ctx.attendance_service.for_day(&app, day)?;
            let stats = trimtrack_core::services::attendance::day_stats(&list);
            if json {
                return print_json(&serde_json::json!({ "day": day, "stats": stats, "members": list }));
            }

            println!("{} {}", "Attendance for".bold(), day.to_string().bold());
            println!();
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Attendance"]);
            for entry in &list {
                let mark = match (entry.has_log, entry.attended) {
                    (true, true) => "present".green(),
                    (true, false) => "absent".red(),
                    (false, _) => "no log".dimmed(),
                };
                table.add_row(vec![entry.user_id.clone(), entry.name.clone(), mark.to_string()]);
            }
            println!("{table}");
            println!(
                "Total {}  Present {}  Absent {}  No log {}  Rate {}%",
                stats.total, stats.attended, stats.absent, stats.no_log, stats.percentage
            );
        }

        AttendanceCommands::Export { output: path } => {
            let app = ctx.app_context()?;
            let today = Utc::now().date_naive();
            match path {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    let rows = ctx
                        .attendance_service
                        .export_csv(&app, today, BufWriter::new(file))?;
                    output::success(&format!("Wrote {} row(s) to {}", rows, path.display()));
                }
                None => {
                    ctx.attendance_service.export_csv(&app, today, io::stdout().lock())?;
                }
            }
        }
    }

    Ok(())
}
