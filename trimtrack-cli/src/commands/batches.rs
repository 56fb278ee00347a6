//! Batches command - cohorts and the active batch selection

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;

use super::{confirm, get_context, parse_day, parse_patch, print_json};
use crate::output;
use trimtrack_core::domain::dates::start_of_day;
use trimtrack_core::Batch;

#[derive(Subcommand)]
pub enum BatchesCommands {
    /// List batches with status and member counts
    List,
    /// Add a batch
    Add {
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change batch fields as key=value pairs
    Edit {
        id: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Mark a batch completed
    Complete { id: String },
    /// Delete a batch (members keep their batch id)
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// Scope every view to one batch
    Activate { id: String },
    /// Show all batches again
    Deactivate,
}

pub fn run(command: BatchesCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let service = &ctx.batch_service;
    let now = Utc::now();

    match command {
        BatchesCommands::List => {
            let app = ctx.app_context()?;
            let summaries = service.summaries(&app, now)?;
            if json {
                return print_json(&summaries);
            }
            if summaries.is_empty() {
                output::info("No batches yet. Add one with 'tt batches add NAME --start .. --end ..'.");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["", "ID", "Name", "Start", "End", "Status", "Members"]);
            for s in &summaries {
                table.add_row(vec![
                    if s.is_active_selection { "*".green().to_string() } else { String::new() },
                    s.batch.id.clone(),
                    s.batch.name.clone(),
                    s.batch.start_date.format("%Y-%m-%d").to_string(),
                    s.batch.end_date.format("%Y-%m-%d").to_string(),
                    output::batch_status(s.effective_status).to_string(),
                    s.member_count.to_string(),
                ]);
            }
            println!("{table}");
        }

        BatchesCommands::Add {
            name,
            start,
            end,
            description,
        } => {
            let start = start_of_day(parse_day(Some(&start))?);
            let end = start_of_day(parse_day(Some(&end))?);
            let mut batch = Batch::new(name, start, end);
            batch.description = description;
            let batch = service.add(batch)?;
            if json {
                return print_json(&batch);
            }
            output::success(&format!("Added batch {} ({})", batch.name, batch.id));
        }

        BatchesCommands::Edit { id, fields } => {
            let batch = service.edit(&id, parse_patch(&fields)?)?;
            if json {
                return print_json(&batch);
            }
            output::success(&format!("Updated batch {}", batch.name));
        }

        BatchesCommands::Complete { id } => {
            let batch = service.complete(&id)?;
            output::success(&format!("Batch {} marked completed", batch.name));
        }

        BatchesCommands::Delete { id, force } => {
            let batch = service.get(&id)?;
            if !confirm(&format!("Delete batch {}?", batch.name), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            service.delete(&id)?;
            output::success(&format!("Deleted batch {}", batch.name));
        }

        BatchesCommands::Activate { id } => {
            let batch = service.activate(&id)?;
            output::success(&format!("Active batch: {}", batch.name));
        }

        BatchesCommands::Deactivate => {
            service.deactivate()?;
            output::success("Showing all batches");
        }
    }

    Ok(())
}
