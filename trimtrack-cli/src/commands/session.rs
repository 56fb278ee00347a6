//! Session command - who is acting and which batch is active

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, print_json};
use crate::output;
use trimtrack_core::Identity;

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Show the acting identity and active batch
    Show,
    /// Act as a trainer (by trainer id) or as an admin
    LoginAs {
        /// Trainer id
        #[arg(conflicts_with = "admin", required_unless_present = "admin")]
        trainer: Option<String>,
        /// Act as an admin with this username
        #[arg(long)]
        admin: Option<String>,
    },
    /// Forget the acting identity (back to unscoped admin)
    Logout,
}

pub fn run(command: SessionCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let session = &ctx.session_service;

    match command {
        SessionCommands::Show => {
            let app = ctx.app_context()?;
            if json {
                return print_json(&serde_json::json!({
                    "authenticated": session.is_authenticated()?,
                    "identity": app.identity,
                    "activeBatchId": app.active_batch_id,
                }));
            }
            let who = app.identity.display_name();
            println!("Acting as:    {} ({})", who.bold(), app.identity.role.as_str());
            match app.active_batch_id {
                Some(id) => println!("Active batch: {id}"),
                None => println!("Active batch: {}", "all batches".dimmed()),
            }
        }

        SessionCommands::LoginAs { trainer, admin } => {
            let identity = match (trainer, admin) {
                (Some(trainer_id), _) => session.login_as_trainer(&trainer_id)?,
                (None, Some(username)) => {
                    let identity = Identity::admin(username);
                    session.login_as(&identity)?;
                    identity
                }
                (None, None) => bail!("pass a trainer id or --admin NAME"),
            };
            output::success(&format!(
                "Now acting as {} ({})",
                identity.display_name(),
                identity.role.as_str()
            ));
        }

        SessionCommands::Logout => {
            session.logout()?;
            output::success("Logged out; acting as admin");
        }
    }

    Ok(())
}
