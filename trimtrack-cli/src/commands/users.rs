//! Users command - the member roster and daily logs

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{confirm, get_context, parse_day, parse_patch, print_json};
use crate::output;
use trimtrack_core::domain::{FoodItem, Gender, Meals, NewUser, ProgramType, ProgressStatus, User};
use trimtrack_core::services::metrics::{self, CalorieParams};
use trimtrack_core::services::DailyLog;

/// Logs shown by `tt users show`
const RECENT_LOGS: usize = 7;

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List members visible in the current scope
    List,
    /// Show a member's profile and progress
    Show {
        /// Member id
        id: String,
    },
    /// Add a member
    Add {
        #[arg(long)]
        name: String,
        /// Current weight in kg
        #[arg(long)]
        weight: f64,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Goal weight in kg
        #[arg(long)]
        goal: f64,
        /// male or female
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        /// 60-day or 90-day
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        meal_plan: Option<String>,
        /// Trainer name
        #[arg(long)]
        trainer: Option<String>,
        /// Batch id (defaults to the active batch)
        #[arg(long)]
        batch: Option<String>,
    },
    /// Change profile fields, e.g. `tt users edit ID age=31 trainer="Trainer B"`
    Edit {
        id: String,
        /// key=value pairs
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Record the daily log for a member
    Log {
        id: String,
        /// Day to record (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Weight in kg (defaults to the last known weight)
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long, default_value = "")]
        breakfast: String,
        #[arg(long, default_value = "")]
        lunch: String,
        #[arg(long, default_value = "")]
        dinner: String,
        /// Food item as `name:calories[:time]`; repeatable
        #[arg(long = "food")]
        food: Vec<String>,
        /// Member attended the session
        #[arg(long)]
        attended: bool,
        /// Member reported reduced size
        #[arg(long)]
        size_reduced: bool,
    },
    /// Add a trainer note
    Note { id: String, text: String },
    /// Set progress status (onTrack, atRisk, struggling)
    SetStatus { id: String, status: String },
    /// Delete a member
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: UsersCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let now = Utc::now();

    match command {
        UsersCommands::List => {
            let app = ctx.app_context()?;
            let users = ctx.user_service.list(&app)?;
            if json {
                return print_json(&users);
            }
            if users.is_empty() {
                output::info("No members in this scope.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Trainer", "Program", "Current", "Goal", "BMI", "Status"]);
            for user in &users {
                table.add_row(vec![
                    user.id.clone(),
                    user.name.clone(),
                    output::opt(user.trainer.as_deref()),
                    user.program_type.as_str().to_string(),
                    output::kg(user.current_weight()),
                    output::kg(user.goal_weight),
                    output::opt(user.bmi),
                    output::progress_status(user.progress_status).to_string(),
                ]);
            }
            println!("{table}");
            println!("{} member(s)", users.len());
        }

        UsersCommands::Show { id } => {
            let user = ctx.user_service.get(&id)?;
            let profile = Profile::of(&user, ctx.config.calories, now);
            if json {
                return print_json(&json!({ "user": user, "metrics": profile }));
            }
            print_profile(&user, &profile);
        }

        UsersCommands::Add {
            name,
            weight,
            height,
            goal,
            gender,
            age,
            program,
            meal_plan,
            trainer,
            batch,
        } => {
            let batch_id = match batch {
                Some(b) => Some(b),
                None => ctx.batch_service.active_batch_id()?,
            };
            let form = NewUser {
                name: Some(name),
                gender: gender.as_deref().map(str::parse::<Gender>).transpose()?,
                age,
                height: Some(height),
                goal_weight: Some(goal),
                current_weight: Some(weight),
                program_type: program.as_deref().map(str::parse::<ProgramType>).transpose()?,
                meal_plan,
                trainer,
                batch_id,
            };
            let user = ctx.user_service.add(form, now)?;
            if json {
                return print_json(&user);
            }
            output::success(&format!("Added {} ({})", user.name, user.id));
        }

        UsersCommands::Edit { id, fields } => {
            let user = ctx.user_service.edit(&id, parse_patch(&fields)?)?;
            if json {
                return print_json(&user);
            }
            output::success(&format!("Updated {}", user.name));
        }

        UsersCommands::Log {
            id,
            date,
            weight,
            breakfast,
            lunch,
            dinner,
            food,
            attended,
            size_reduced,
        } => {
            let day = parse_day(date.as_deref())?;
            let entry = DailyLog {
                weight,
                meals: Meals {
                    breakfast,
                    lunch,
                    dinner,
                },
                food_intake: food.iter().map(|f| parse_food(f)).collect::<Result<_>>()?,
                attended,
                size_reduced,
            };
            let user = ctx.user_service.log_day(&id, day, entry)?;
            if json {
                return print_json(&user.log_for_day(day));
            }
            output::success(&format!("Logged {} for {}", day, user.name));
        }

        UsersCommands::Note { id, text } => {
            let user = ctx.user_service.add_note(&id, &text, now)?;
            output::success(&format!("Note added for {}", user.name));
        }

        UsersCommands::SetStatus { id, status } => {
            let status: ProgressStatus = status.parse()?;
            let user = ctx.user_service.set_status(&id, status)?;
            output::success(&format!("{} is now {}", user.name, status.label()));
        }

        UsersCommands::Delete { id, force } => {
            let user = ctx.user_service.get(&id)?;
            if !confirm(&format!("Delete {} and all their logs?", user.name), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            ctx.user_service.delete(&id)?;
            output::success(&format!("Deleted {}", user.name));
        }
    }

    Ok(())
}

/// `name:calories[:time]`
fn parse_food(raw: &str) -> Result<FoodItem> {
    let mut parts = raw.splitn(3, ':');
    let item = parts.next().map(str::trim).unwrap_or_default();
    if item.is_empty() {
        return Err(anyhow!("food item needs a name: '{raw}'"));
    }
    let calories = parts
        .next()
        .map(|c| c.trim().parse::<u32>())
        .transpose()
        .with_context(|| format!("invalid calories in '{raw}'"))?
        .unwrap_or(0);
    let time = parts.next().unwrap_or_default().trim();
    Ok(FoodItem::new(item, calories, time))
}

/// Derived figures for one member; absent inputs show as `None`
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    bmi: Option<f64>,
    weight_loss: Option<f64>,
    progress_percent: Option<u32>,
    program_day: Option<u32>,
    training_phase: Option<&'static str>,
    attendance_percent: u32,
    streak: u32,
    recommended_calories: Option<u32>,
    velocity_per_week: Option<f64>,
    days_to_goal: Option<u32>,
}

impl Profile {
    fn of(user: &User, calories: CalorieParams, now: chrono::DateTime<Utc>) -> Self {
        let start = user.program_start();
        let day = start.map(|s| metrics::program_day(s, user.program_type, now));
        let velocity = start.and_then(|s| metrics::weight_loss_velocity(&user.logs, s, now));
        let days_to_goal = match (user.current_weight(), user.goal_weight, velocity) {
            (Some(current), Some(goal), Some(v)) => metrics::days_to_goal(current, goal, v),
            _ => None,
        };

        Self {
            bmi: metrics::user_bmi(user).ok(),
            weight_loss: metrics::weight_loss(&user.logs).ok().map(metrics::round1),
            progress_percent: start
                .map(|s| metrics::program_progress_percent(s, user.program_type, now)),
            program_day: day,
            training_phase: day.map(|d| metrics::training_phase(d).label()),
            attendance_percent: metrics::attendance_percent(&user.logs),
            streak: metrics::attendance_streak(&user.logs, now.date_naive()),
            recommended_calories: metrics::user_recommended_calories(user, calories).ok(),
            velocity_per_week: velocity.map(metrics::round1),
            days_to_goal,
        }
    }
}

fn print_profile(user: &User, profile: &Profile) {
    println!("{} {}", user.name.bold(), format!("({})", user.id).dimmed());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Status".to_string(), output::progress_status(user.progress_status).to_string()]);
    table.add_row(vec!["Trainer".to_string(), output::opt(user.trainer.as_deref())]);
    table.add_row(vec!["Batch".to_string(), output::opt(user.batch_id.as_deref())]);
    table.add_row(vec!["Program".to_string(), user.program_type.as_str().to_string()]);
    table.add_row(vec!["Meal plan".to_string(), output::opt(user.meal_plan.as_deref())]);
    table.add_row(vec!["Height".to_string(), output::opt(user.height.map(|h| format!("{h} cm")))]);
    table.add_row(vec!["Starting weight".to_string(), output::kg(user.starting_weight())]);
    table.add_row(vec!["Current weight".to_string(), output::kg(user.current_weight())]);
    table.add_row(vec!["Goal weight".to_string(), output::kg(user.goal_weight)]);
    table.add_row(vec!["Weight lost".to_string(), output::kg(profile.weight_loss)]);
    table.add_row(vec!["BMI".to_string(), output::opt(profile.bmi)]);
    table.add_row(vec![
        "Program day".to_string(),
        match (profile.program_day, profile.training_phase) {
            (Some(day), Some(phase)) => format!("{day} ({phase})"),
            _ => "-".to_string(),
        },
    ]);
    table.add_row(vec!["Progress".to_string(), output::opt(profile.progress_percent.map(|p| format!("{p}%")))]);
    table.add_row(vec!["Attendance".to_string(), format!("{}%", profile.attendance_percent)]);
    table.add_row(vec!["Streak".to_string(), format!("{} day(s)", profile.streak)]);
    table.add_row(vec![
        "Calorie target".to_string(),
        output::opt(profile.recommended_calories.map(|c| format!("{c} kcal"))),
    ]);
    table.add_row(vec![
        "Pace".to_string(),
        output::opt(profile.velocity_per_week.map(|v| format!("{v} kg/week"))),
    ]);
    table.add_row(vec![
        "Days to goal".to_string(),
        output::opt(profile.days_to_goal),
    ]);
    println!("{table}");

    if !user.logs.is_empty() {
        println!();
        println!("{}", "Recent logs".bold());
        let mut logs = output::create_table();
        logs.set_header(vec!["Date", "Weight", "BMI", "Attended", "Size", "kcal"]);
        for log in user.logs.iter().rev().take(RECENT_LOGS) {
            logs.add_row(vec![
                log.day().to_string(),
                output::kg(log.weight),
                output::opt(log.bmi),
                if log.attended { "yes".green().to_string() } else { "no".red().to_string() },
                if log.size_reduced { "reduced".to_string() } else { "-".to_string() },
                log.total_calories.to_string(),
            ]);
        }
        println!("{logs}");
    }

    if !user.notes.is_empty() {
        println!();
        println!("{}", "Notes".bold());
        for note in &user.notes {
            println!("  {} {}", note.date.format("%Y-%m-%d").to_string().dimmed(), note.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_food() {
        let item = parse_food("Oats:150:08:00").unwrap();
        assert_eq!(item.item, "Oats");
        assert_eq!(item.calories, 150);
        assert_eq!(item.time, "08:00");

        let bare = parse_food("Apple").unwrap();
        assert_eq!(bare.calories, 0);
        assert!(parse_food("Rice:lots").is_err());
        assert!(parse_food(":100").is_err());
    }
}
