//! Calc command - nutrient plan calculator

use anyhow::Result;
use colored::Colorize;

use super::print_json;
use crate::output;
use trimtrack_core::domain::Gender;
use trimtrack_core::services::metrics::{self, ActivityLevel, NutrientInput, WeightGoal};

#[derive(clap::Args)]
pub struct CalcArgs {
    /// Current weight in kg
    #[arg(long)]
    weight: f64,
    /// Height in cm
    #[arg(long)]
    height: f64,
    #[arg(long)]
    age: u32,
    /// male or female
    #[arg(long)]
    gender: String,
    /// Target weight in kg (defaults to the current weight)
    #[arg(long)]
    target: Option<f64>,
    /// sedentary, light, moderate, active or very-active
    #[arg(long, default_value = "moderate")]
    activity: String,
    /// lose, maintain or gain
    #[arg(long, default_value = "lose")]
    goal: String,
}

pub fn run(args: CalcArgs, json: bool) -> Result<()> {
    let input = NutrientInput {
        weight_kg: args.weight,
        height_cm: args.height,
        age: args.age,
        gender: args.gender.parse::<Gender>()?,
        target_weight_kg: args.target.unwrap_or(args.weight),
        activity: args.activity.parse::<ActivityLevel>()?,
        goal: args.goal.parse::<WeightGoal>()?,
    };
    let plan = metrics::nutrient_plan(&input)?;

    if json {
        return print_json(&plan);
    }

    println!("{}", "Daily nutrient plan".bold());
    let mut table = output::create_table();
    table.add_row(vec!["BMR".to_string(), format!("{} kcal", plan.bmr)]);
    table.add_row(vec!["Maintenance (TDEE)".to_string(), format!("{} kcal", plan.tdee)]);
    table.add_row(vec!["Target".to_string(), format!("{} kcal", plan.target_calories).green().to_string()]);
    table.add_row(vec!["Protein".to_string(), format!("{} g", plan.protein_g)]);
    table.add_row(vec!["Carbs".to_string(), format!("{} g", plan.carbs_g)]);
    table.add_row(vec!["Fat".to_string(), format!("{} g", plan.fat_g)]);
    table.add_row(vec!["Water".to_string(), format!("{:.1} L", f64::from(plan.water_ml) / 1000.0)]);
    table.add_row(vec!["BMI now / target".to_string(), format!("{} / {}", plan.current_bmi, plan.target_bmi)]);
    if plan.weeks_to_goal > 0 {
        table.add_row(vec![
            "Weeks to target".to_string(),
            format!("{} at {:+.1} kg/week", plan.weeks_to_goal, plan.weekly_change_kg),
        ]);
    }
    println!("{table}");

    Ok(())
}
