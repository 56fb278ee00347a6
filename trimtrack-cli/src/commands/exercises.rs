//! Exercises command - library, groups, weekly plan and batch overrides

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{confirm, get_context, parse_patch, print_json};
use crate::output;
use trimtrack_core::services::exercises::current_week;
use trimtrack_core::{Exercise, ExerciseGroup};

#[derive(Subcommand)]
pub enum ExercisesCommands {
    /// List the exercise library
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Add an exercise
    Add {
        name: String,
        #[arg(long, default_value = "cardio")]
        category: String,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
        /// e.g. 30s, 2min
        #[arg(long)]
        duration: Option<String>,
        #[arg(long, default_value = "")]
        reps: String,
        #[arg(long, default_value = "")]
        instructions: String,
        /// Comma-separated muscle groups
        #[arg(long, value_delimiter = ',')]
        muscles: Vec<String>,
        /// kcal per minute
        #[arg(long)]
        calories: Option<u32>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Change exercise fields as key=value pairs
    Edit {
        id: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Copy an exercise under a new id
    Duplicate { id: String },
    /// Delete an exercise from the library
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// List exercise groups
    Groups,
    /// Create a group from exercise ids
    AddGroup {
        name: String,
        /// Exercise ids, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        exercises: Vec<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete an exercise group
    DeleteGroup {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// Show the weekly plan, or one batch's schedule
    Plan {
        /// Batch id; shows its overrides and current week
        #[arg(long)]
        batch: Option<String>,
    },
    /// Put a group in a week of the program-wide plan (omit GROUP to clear)
    Assign { week: u32, group: Option<String> },
    /// Remove a week and shift later weeks down
    RemoveWeek { week: u32 },
    /// Override a week for one batch (omit GROUP to clear)
    BatchAssign {
        batch: String,
        week: u32,
        group: Option<String>,
    },
}

pub fn run(command: ExercisesCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let service = &ctx.exercise_service;
    let now = Utc::now();

    match command {
        ExercisesCommands::List { category } => {
            let mut exercises = service.list()?;
            if let Some(category) = category {
                exercises.retain(|e| e.category.eq_ignore_ascii_case(&category));
            }
            if json {
                return print_json(&exercises);
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Category", "Difficulty", "Duration", "Reps", "kcal/min"]);
            for e in &exercises {
                table.add_row(vec![
                    e.id.clone(),
                    e.name.clone(),
                    e.category.clone(),
                    e.difficulty.clone(),
                    output::text(&e.duration),
                    output::text(&e.reps),
                    e.calories_burn.to_string(),
                ]);
            }
            println!("{table}");
        }

        ExercisesCommands::Add {
            name,
            category,
            difficulty,
            equipment,
            duration,
            reps,
            instructions,
            muscles,
            calories,
            tags,
        } => {
            let mut exercise = Exercise::new(name, category);
            if let Some(d) = difficulty {
                exercise.difficulty = d;
            }
            if let Some(e) = equipment {
                exercise.equipment = e;
            }
            if let Some(d) = duration {
                exercise.duration = d;
            }
            if let Some(c) = calories {
                exercise.calories_burn = c;
            }
            exercise.reps = reps;
            exercise.instructions = instructions;
            exercise.target_muscles = muscles;
            exercise.tags = tags;

            let exercise = service.add(exercise)?;
            if json {
                return print_json(&exercise);
            }
            output::success(&format!("Added {} ({})", exercise.name, exercise.id));
        }

        ExercisesCommands::Edit { id, fields } => {
            let exercise = service.edit(&id, parse_patch(&fields)?, now)?;
            if json {
                return print_json(&exercise);
            }
            output::success(&format!("Updated {}", exercise.name));
        }

        ExercisesCommands::Duplicate { id } => {
            let copy = service.duplicate(&id, now)?;
            if json {
                return print_json(&copy);
            }
            output::success(&format!("Created {} ({})", copy.name, copy.id));
        }

        ExercisesCommands::Delete { id, force } => {
            let exercise = service.get(&id)?;
            if !confirm(&format!("Delete exercise {}?", exercise.name), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            service.delete(&id)?;
            output::success(&format!("Deleted {}", exercise.name));
        }

        ExercisesCommands::Groups => {
            let groups = service.groups()?;
            if json {
                return print_json(&groups);
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Difficulty", "Exercises", "Missing"]);
            for group in &groups {
                let resolved = service.resolve_group(&group.id)?;
                let names: Vec<&str> = resolved.exercises.iter().map(|e| e.name.as_str()).collect();
                table.add_row(vec![
                    group.id.clone(),
                    group.name.clone(),
                    group.difficulty.clone(),
                    names.join(", "),
                    if resolved.missing.is_empty() {
                        String::new()
                    } else {
                        resolved.missing.len().to_string().red().to_string()
                    },
                ]);
            }
            println!("{table}");
        }

        ExercisesCommands::AddGroup {
            name,
            exercises,
            difficulty,
            description,
        } => {
            let mut group = ExerciseGroup::new(name, exercises);
            if let Some(d) = difficulty {
                group.difficulty = d;
            }
            group.description = description;
            let group = service.add_group(group)?;
            let resolved = service.resolve_group(&group.id)?;
            if json {
                return print_json(&json!({ "group": group, "missing": resolved.missing }));
            }
            output::success(&format!("Added group {} ({})", group.name, group.id));
            if !resolved.missing.is_empty() {
                output::warning(&format!("Unknown exercise ids: {}", resolved.missing.join(", ")));
            }
        }

        ExercisesCommands::DeleteGroup { id, force } => {
            if !confirm(&format!("Delete group {id}?"), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            if service.delete_group(&id)? {
                output::success(&format!("Deleted group {id}"));
            } else {
                output::warning(&format!("No group with id {id}"));
            }
        }

        ExercisesCommands::Plan { batch } => match batch {
            None => {
                let plan = service.plan()?;
                if json {
                    return print_json(&plan);
                }
                if plan.is_empty() {
                    output::info("No weeks planned. Use 'tt exercises assign WEEK GROUP'.");
                    return Ok(());
                }
                let mut table = output::create_table();
                table.set_header(vec!["Week", "Group", "Exercises"]);
                for week in &plan {
                    let (name, count) = match &week.group {
                        Some(g) => (g.name.clone(), g.exercises.len().to_string()),
                        None => (format!("{} (missing)", week.group_id).red().to_string(), "-".to_string()),
                    };
                    table.add_row(vec![week.week_number.to_string(), name, count]);
                }
                println!("{table}");
            }
            Some(batch_id) => {
                let batch = ctx.batch_service.get(&batch_id)?;
                let overrides = service.batch_assignments(&batch_id)?;
                let current = service.group_for_batch_week(&batch, now)?;
                let week = current_week(&batch, now);
                if json {
                    return print_json(&json!({
                        "batch": batch.id,
                        "currentWeek": week,
                        "current": current,
                        "overrides": overrides,
                    }));
                }

                println!("{} {}", batch.name.bold(), format!("(week {week})").dimmed());
                match current.as_ref().and_then(|w| w.group.as_ref()) {
                    Some(group) => println!("This week: {}", group.name.green()),
                    None => println!("This week: {}", "nothing planned".dimmed()),
                }
                if !overrides.is_empty() {
                    println!();
                    let mut table = output::create_table();
                    table.set_header(vec!["Week", "Group", "Assigned"]);
                    for a in &overrides {
                        table.add_row(vec![
                            a.week_num.to_string(),
                            a.group_id.clone(),
                            output::opt(a.assigned_at.map(|d| d.format("%Y-%m-%d"))),
                        ]);
                    }
                    println!("{table}");
                }
            }
        },

        ExercisesCommands::Assign { week, group } => {
            service.assign_week(week, group.as_deref(), now)?;
            match group {
                Some(g) => output::success(&format!("Week {week} now runs group {g}")),
                None => output::success(&format!("Week {week} cleared")),
            }
        }

        ExercisesCommands::RemoveWeek { week } => {
            if service.remove_week(week)? {
                output::success(&format!("Removed week {week}; later weeks moved up"));
            } else {
                output::warning(&format!("Week {week} was not planned"));
            }
        }

        ExercisesCommands::BatchAssign { batch, week, group } => {
            service.assign_batch_week(&batch, week, group.as_deref(), now)?;
            match group {
                Some(g) => output::success(&format!("Batch {batch} week {week} now runs group {g}")),
                None => output::success(&format!("Batch {batch} week {week} override cleared")),
            }
        }
    }

    Ok(())
}
