//! Trainers command

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{confirm, get_context, parse_patch, print_json};
use crate::output;
use trimtrack_core::Trainer;

#[derive(Subcommand)]
pub enum TrainersCommands {
    /// List trainers with their member counts
    List,
    /// Add a trainer
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        specialization: String,
    },
    /// Change trainer fields as key=value pairs
    Edit {
        id: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Delete a trainer (members keep the trainer name)
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: TrainersCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let service = &ctx.trainer_service;

    match command {
        TrainersCommands::List => {
            let summaries = service.summaries()?;
            if json {
                return print_json(&summaries);
            }
            if summaries.is_empty() {
                output::info("No trainers yet. Add one with 'tt trainers add NAME'.");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Email", "Phone", "Specialization", "Members"]);
            for s in &summaries {
                table.add_row(vec![
                    s.trainer.id.clone(),
                    s.trainer.name.clone(),
                    output::text(&s.trainer.email),
                    output::text(&s.trainer.phone),
                    output::text(&s.trainer.specialization),
                    s.member_count.to_string(),
                ]);
            }
            println!("{table}");
        }

        TrainersCommands::Add {
            name,
            email,
            phone,
            specialization,
        } => {
            let mut trainer = Trainer::new(name);
            trainer.email = email;
            trainer.phone = phone;
            trainer.specialization = specialization;
            let trainer = service.add(trainer)?;
            if json {
                return print_json(&trainer);
            }
            output::success(&format!("Added trainer {} ({})", trainer.name, trainer.id));
        }

        TrainersCommands::Edit { id, fields } => {
            let trainer = service.edit(&id, parse_patch(&fields)?)?;
            if json {
                return print_json(&trainer);
            }
            output::success(&format!("Updated trainer {}", trainer.name));
        }

        TrainersCommands::Delete { id, force } => {
            let trainer = service.get(&id)?;
            let members = service.members(&id)?.len();
            if members > 0 {
                output::warning(&format!(
                    "{} member(s) still list {} as their trainer.",
                    members, trainer.name
                ));
            }
            if !confirm(&format!("Delete trainer {}?", trainer.name), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            service.delete(&id)?;
            output::success(&format!("Deleted trainer {}", trainer.name));
        }
    }

    Ok(())
}
