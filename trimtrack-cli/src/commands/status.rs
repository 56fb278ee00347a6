//! Status command - store contents and the current scope

use anyhow::Result;
use colored::Colorize;

use super::{get_context, print_json};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let app = ctx.app_context()?;
    let status = ctx.status_service.get_status(&app)?;

    if json {
        return print_json(&status);
    }

    println!("{}", "Trimtrack Status".bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Collection", "Records"]);
    for count in &status.collections {
        table.add_row(vec![count.key.clone(), count.records.to_string()]);
    }
    println!("{table}");
    println!();

    println!("Acting as:     {} ({})", status.acting_as, status.role);
    println!(
        "Active batch:  {}",
        status.active_batch.as_deref().unwrap_or("all batches")
    );
    println!("Visible users: {}", status.visible_users);
    if ctx.config.demo_mode {
        println!();
        output::warning("Demo mode is ON. Run 'tt demo off' to return to your data.");
    }

    Ok(())
}
