//! Report command - overview, weekly report and calorie comparison

use anyhow::Result;
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;

use super::{get_context, print_json};
use crate::output;
use trimtrack_core::services::{CalorieComparison, Overview, WeeklyReport};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ReportKind {
    /// Counts by progress status
    Overview,
    /// Activity, weight loss, top performers and the progress funnel
    #[default]
    Weekly,
    /// Latest intake against the calorie target
    Calories,
}

pub fn run(kind: ReportKind, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let app = ctx.app_context()?;
    let now = Utc::now();

    match kind {
        ReportKind::Overview => {
            let overview = ctx.report_service.overview(&app, now)?;
            if json {
                return print_json(&overview);
            }
            print_overview(&overview);
        }
        ReportKind::Weekly => {
            let overview = ctx.report_service.overview(&app, now)?;
            let weekly = ctx.report_service.weekly(&app, now)?;
            if json {
                return print_json(&serde_json::json!({ "overview": overview, "weekly": weekly }));
            }
            print_overview(&overview);
            println!();
            print_weekly(&weekly);
        }
        ReportKind::Calories => {
            let comparison = ctx.report_service.calories(&app)?;
            if json {
                return print_json(&comparison);
            }
            print_calories(&comparison);
        }
    }

    Ok(())
}

fn print_overview(overview: &Overview) {
    println!("{}", "Overview".bold());
    let mut table = output::create_table();
    table.add_row(vec!["Members".to_string(), overview.total.to_string()]);
    table.add_row(vec!["On track".to_string(), overview.on_track.to_string().green().to_string()]);
    table.add_row(vec!["At risk".to_string(), overview.at_risk.to_string().yellow().to_string()]);
    table.add_row(vec!["Struggling".to_string(), overview.struggling.to_string().red().to_string()]);
    table.add_row(vec!["Average progress".to_string(), format!("{}%", overview.average_progress)]);
    println!("{table}");
}

fn print_weekly(report: &WeeklyReport) {
    println!("{}", "This week".bold());
    println!(
        "Active {}/{}  Avg loss {:.1} kg  Log completion {}%",
        report.active_users, report.total_users, report.avg_weight_loss, report.completion_rate
    );

    if !report.top_performers.is_empty() {
        println!();
        println!("{}", "Top performers".bold());
        let mut table = output::create_table();
        table.set_header(vec!["Name", "Lost", "Per day"]);
        for p in &report.top_performers {
            table.add_row(vec![
                p.name.clone(),
                format!("{:.1} kg", p.weight_loss),
                format!("{:.2} kg", p.loss_per_day),
            ]);
        }
        println!("{table}");
    }

    if !report.needs_attention.is_empty() {
        println!();
        println!("{}", "Needs attention".yellow().bold());
        for item in &report.needs_attention {
            let since = match item.days_since_log {
                Some(days) => format!("last log {days} day(s) ago"),
                None => "no logs".to_string(),
            };
            println!("  {} {}", item.name, since.dimmed());
        }
    }

    println!();
    println!("{}", "Progress funnel".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Category", "Members", "%"]);
    for bucket in &report.funnel {
        table.add_row(vec![
            bucket.category.label().to_string(),
            bucket.count.to_string(),
            format!("{}%", bucket.percent),
        ]);
    }
    println!("{table}");
}

fn print_calories(comparison: &CalorieComparison) {
    println!("{}", "Calories: latest intake vs target".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Name", "Consumed", "Target", "BMI", ""]);
    for row in &comparison.rows {
        let verdict = match row.recommended {
            None => "no target".dimmed(),
            Some(_) if row.within_target() => "within".green(),
            Some(_) => "over".red(),
        };
        table.add_row(vec![
            row.name.clone(),
            row.consumed.to_string(),
            output::opt(row.recommended),
            output::opt(row.bmi),
            verdict.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "Avg target {} kcal  Avg consumed {} kcal  Within target {}%",
        comparison.avg_recommended, comparison.avg_consumed, comparison.within_target_percent
    );
}
