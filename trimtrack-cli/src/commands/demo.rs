//! Demo command - manage demo mode

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;

use super::{get_trimtrack_dir, print_json};
use trimtrack_core::services::DemoService;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode with a freshly seeded roster
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off {
        /// Also delete the demo database
        #[arg(long)]
        clean: bool,
    },
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<DemoCommands>, json: bool) -> Result<()> {
    let dir = get_trimtrack_dir()?;
    std::fs::create_dir_all(&dir)?;
    let demo_service = DemoService::new(&dir);

    match command {
        Some(DemoCommands::On) => {
            let summary = demo_service.enable(Utc::now())?;
            if json {
                return print_json(&summary);
            }
            println!("{}", "Demo mode enabled".green());
            println!(
                "Seeded {} members, {} trainers and {} batch. Run 'tt users list' to see them.",
                summary.users, summary.trainers, summary.batches
            );
        }
        Some(DemoCommands::Off { clean }) => {
            demo_service.disable(clean)?;
            println!("{}", "Demo mode disabled".yellow());
        }
        Some(DemoCommands::Status) | None => {
            let enabled = demo_service.is_enabled()?;
            if json {
                return print_json(&serde_json::json!({ "demoMode": enabled }));
            }
            if enabled {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
        }
    }

    Ok(())
}
