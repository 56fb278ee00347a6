//! Derived metrics - pure functions over a member and their logs
//!
//! Nothing here reads storage or the clock; callers pass `now`. Metrics
//! whose inputs are absent fail with `MissingInput`. Metrics whose maths is
//! undefined for the given inputs (zero elapsed time, non-positive velocity)
//! return `None` instead of leaking infinities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dates::days_since;
use crate::domain::result::{Error, Result};
use crate::domain::{Gender, LogEntry, ProgramType, User};

/// Days in one training cycle
const CYCLE_DAYS: u32 = 30;

/// Logs considered when judging recent size reduction and stalled weight
const RECENT_LOGS: usize = 5;

/// Days without a log before a member needs attention
const STALE_LOG_DAYS: i64 = 3;

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Body mass index, rounded to one decimal
pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    if !(height_cm.is_finite() && height_cm > 0.0) {
        return Err(Error::missing_input("height is required for BMI"));
    }
    if !weight_kg.is_finite() {
        return Err(Error::missing_input("weight is required for BMI"));
    }
    let meters = height_cm / 100.0;
    Ok(round1(weight_kg / (meters * meters)))
}

/// BMI from the member's latest weight and height on file
pub fn user_bmi(user: &User) -> Result<f64> {
    let weight = user
        .current_weight()
        .ok_or_else(|| Error::missing_input("no weight logged"))?;
    let height = user
        .height
        .ok_or_else(|| Error::missing_input("height is required for BMI"))?;
    bmi(weight, height)
}

/// Share of the program elapsed, as a whole percentage capped at 100
pub fn program_progress_percent(
    start: DateTime<Utc>,
    program_type: ProgramType,
    now: DateTime<Utc>,
) -> u32 {
    let total = program_type.total_days();
    if total == 0 {
        return 0;
    }
    let elapsed = days_since(start, now).max(0) as f64;
    let percent = (elapsed / f64::from(total) * 100.0).round();
    percent.min(100.0) as u32
}

/// First recorded weight minus last recorded weight, in kg
///
/// Uses insertion order, not date order.
pub fn weight_loss(logs: &[LogEntry]) -> Result<f64> {
    let first = logs.iter().find_map(|l| l.weight);
    let last = logs.iter().rev().find_map(|l| l.weight);
    match (first, last) {
        (Some(first), Some(last)) => Ok(first - last),
        _ => Err(Error::missing_input("no weight logged")),
    }
}

/// Mifflin-St Jeor basal metabolic rate
///
/// Anything other than `Male` uses the female constant.
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female | Gender::Unspecified => base - 161.0,
    }
}

/// Activity multiplier and deficit applied to the BMR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieParams {
    pub activity_factor: f64,
    pub deficit: f64,
}

impl Default for CalorieParams {
    fn default() -> Self {
        Self {
            activity_factor: ActivityLevel::Moderate.factor(),
            deficit: 500.0,
        }
    }
}

/// Daily calorie target: BMR x activity factor - deficit, whole kcal
pub fn recommended_calories(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
    params: CalorieParams,
) -> u32 {
    let tdee = bmr(weight_kg, height_cm, age, gender) * params.activity_factor;
    (tdee - params.deficit).round().max(0.0) as u32
}

/// Calorie target for a member, from their latest weight and profile
pub fn user_recommended_calories(user: &User, params: CalorieParams) -> Result<u32> {
    let weight = user
        .current_weight()
        .ok_or_else(|| Error::missing_input("no weight logged"))?;
    let height = user
        .height
        .ok_or_else(|| Error::missing_input("height is required for calories"))?;
    // Blank form ages were stored as 0
    let age = user
        .age
        .filter(|&age| age > 0)
        .ok_or_else(|| Error::missing_input("age is required for calories"))?;
    Ok(recommended_calories(
        weight,
        height,
        age,
        user.gender.unwrap_or_default(),
        params,
    ))
}

/// Attended entries over all entries, `None` when there are no entries
pub fn attendance_rate(logs: &[LogEntry]) -> Option<f64> {
    if logs.is_empty() {
        return None;
    }
    let attended = logs.iter().filter(|l| l.attended).count();
    Some(attended as f64 / logs.len() as f64)
}

/// Attendance rate as a whole percentage, 0 when there are no entries
pub fn attendance_percent(logs: &[LogEntry]) -> u32 {
    attendance_rate(logs)
        .map(|r| (r * 100.0).round() as u32)
        .unwrap_or(0)
}

/// Weight lost per week since `start`; `None` when no time has elapsed or
/// no weight is on file
pub fn weight_loss_velocity(
    logs: &[LogEntry],
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<f64> {
    let days = days_since(start, now);
    if days <= 0 {
        return None;
    }
    let loss = weight_loss(logs).ok()?;
    Some(loss / (days as f64 / 7.0))
}

/// Days until `goal` at a steady `velocity_per_week`
///
/// `None` when the velocity is not positive (the goal is never reached);
/// zero when the goal is already met.
pub fn days_to_goal(current_kg: f64, goal_kg: f64, velocity_per_week: f64) -> Option<u32> {
    if current_kg <= goal_kg {
        return Some(0);
    }
    if !(velocity_per_week.is_finite() && velocity_per_week > 0.0) {
        return None;
    }
    let weeks = (current_kg - goal_kg) / velocity_per_week;
    Some((weeks * 7.0).ceil() as u32)
}

/// Current day of the program, 1-based and capped at the program length;
/// 0 before the start date
pub fn program_day(start: DateTime<Utc>, program_type: ProgramType, now: DateTime<Utc>) -> u32 {
    let elapsed = days_since(start, now);
    if elapsed < 0 {
        return 0;
    }
    ((elapsed + 1) as u32).min(program_type.total_days())
}

/// Intensity of a program day within the 30-day training cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainingPhase {
    LowImpact,
    Mixed,
    Moderate,
    RestDay,
}

impl TrainingPhase {
    pub fn label(&self) -> &'static str {
        match self {
            TrainingPhase::LowImpact => "Low Impact",
            TrainingPhase::Mixed => "Mixed",
            TrainingPhase::Moderate => "Moderate",
            TrainingPhase::RestDay => "Rest Day",
        }
    }
}

/// Phase of a 1-based program day. Day 7 of each cycle is a rest day.
pub fn training_phase(day: u32) -> TrainingPhase {
    if day == 0 {
        return TrainingPhase::RestDay;
    }
    match (day - 1) % CYCLE_DAYS + 1 {
        1..=6 => TrainingPhase::LowImpact,
        8..=12 => TrainingPhase::Mixed,
        13..=30 => TrainingPhase::Moderate,
        _ => TrainingPhase::RestDay,
    }
}

/// Activity level for the nutrient calculator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            other => Err(Error::validation(format!("unknown activity level: {other}"))),
        }
    }
}

/// Direction of the calorie plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    #[default]
    Lose,
    Maintain,
    Gain,
}

impl WeightGoal {
    /// kcal/day added to maintenance, and the expected kg/week change
    fn adjustment(&self) -> (f64, f64) {
        match self {
            WeightGoal::Lose => (-500.0, -0.5),
            WeightGoal::Maintain => (0.0, 0.0),
            WeightGoal::Gain => (500.0, 0.5),
        }
    }
}

impl std::str::FromStr for WeightGoal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lose" => Ok(WeightGoal::Lose),
            "maintain" => Ok(WeightGoal::Maintain),
            "gain" => Ok(WeightGoal::Gain),
            other => Err(Error::validation(format!("unknown goal: {other}"))),
        }
    }
}

/// Inputs to the nutrient calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub target_weight_kg: f64,
    pub activity: ActivityLevel,
    pub goal: WeightGoal,
}

/// Daily energy, macro and water targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientPlan {
    pub bmr: u32,
    pub tdee: u32,
    pub target_calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
    pub water_ml: u32,
    pub weekly_change_kg: f64,
    pub weeks_to_goal: u32,
    pub current_bmi: f64,
    pub target_bmi: f64,
}

/// Protein 2.2 g/kg, fat 25% of target kcal, carbs the remainder, water
/// 35 ml/kg
pub fn nutrient_plan(input: &NutrientInput) -> Result<NutrientPlan> {
    if !(input.weight_kg.is_finite() && input.weight_kg > 0.0) {
        return Err(Error::missing_input("weight is required"));
    }
    let current_bmi = bmi(input.weight_kg, input.height_cm)?;
    let target_bmi = bmi(input.target_weight_kg, input.height_cm)?;

    let bmr = bmr(input.weight_kg, input.height_cm, input.age, input.gender);
    let tdee = bmr * input.activity.factor();
    let (calorie_delta, weekly_change_kg) = input.goal.adjustment();
    let target = tdee + calorie_delta;

    let protein_g = input.weight_kg * 2.2;
    let fat_g = target * 0.25 / 9.0;
    let carbs_g = (target - protein_g * 4.0 - fat_g * 9.0) / 4.0;

    let weeks_to_goal = if weekly_change_kg == 0.0 {
        0
    } else {
        ((input.target_weight_kg - input.weight_kg).abs() / weekly_change_kg.abs()).round() as u32
    };

    Ok(NutrientPlan {
        bmr: whole(bmr),
        tdee: whole(tdee),
        target_calories: whole(target),
        protein_g: whole(protein_g),
        carbs_g: whole(carbs_g),
        fat_g: whole(fat_g),
        water_ml: whole(input.weight_kg * 35.0),
        weekly_change_kg,
        weeks_to_goal,
        current_bmi,
        target_bmi,
    })
}

fn whole(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Progress funnel bucket from weight change and reported size reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunnelCategory {
    /// Lost weight and size
    Success,
    /// Lost weight but not size
    NeedsExercise,
    /// Lost size but not weight
    NeedsDiet,
    NoProgress,
    /// Fewer than two logs
    NoData,
}

impl FunnelCategory {
    pub const ALL: [FunnelCategory; 5] = [
        FunnelCategory::Success,
        FunnelCategory::NeedsExercise,
        FunnelCategory::NeedsDiet,
        FunnelCategory::NoProgress,
        FunnelCategory::NoData,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FunnelCategory::Success => "Success",
            FunnelCategory::NeedsExercise => "Needs Exercise",
            FunnelCategory::NeedsDiet => "Needs Diet",
            FunnelCategory::NoProgress => "No Progress",
            FunnelCategory::NoData => "No Data",
        }
    }
}

/// Weight is "lost" when the last weight is below the first; size is
/// "reduced" when more than half of the last five logs say so
pub fn funnel_category(logs: &[LogEntry]) -> FunnelCategory {
    if logs.len() < 2 {
        return FunnelCategory::NoData;
    }
    let weight_lost = weight_loss(logs).map(|loss| loss > 0.0).unwrap_or(false);

    let recent = &logs[logs.len().saturating_sub(RECENT_LOGS)..];
    let reduced = recent.iter().filter(|l| l.size_reduced).count();
    let size_reduced = reduced * 2 > recent.len();

    match (weight_lost, size_reduced) {
        (true, true) => FunnelCategory::Success,
        (true, false) => FunnelCategory::NeedsExercise,
        (false, true) => FunnelCategory::NeedsDiet,
        (false, false) => FunnelCategory::NoProgress,
    }
}

/// Consecutive attended calendar days ending on `today`
pub fn attendance_streak(logs: &[LogEntry], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = logs.iter().filter(|l| l.attended).map(LogEntry::day).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak = 0;
    let mut expected = today;
    for day in days {
        if day > today {
            continue;
        }
        if day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

/// Logs recorded as a percentage of the days elapsed so far (capped at the
/// program length and at 100); `None` when the member has no logs
pub fn completion_rate(user: &User, now: DateTime<Utc>) -> Option<f64> {
    if user.logs.is_empty() {
        return None;
    }
    let elapsed = user
        .program_start()
        .map(|start| days_since(start, now))
        .unwrap_or(0);
    let expected = elapsed.clamp(1, i64::from(user.program_type.total_days()));
    Some((user.logs.len() as f64 / expected as f64 * 100.0).min(100.0))
}

/// No logs, no weight change over the last five logs, or no log for more
/// than three days
pub fn needs_attention(user: &User, now: DateTime<Utc>) -> bool {
    let Some(last) = user.latest_log() else {
        return true;
    };

    if user.logs.len() >= RECENT_LOGS {
        let recent = &user.logs[user.logs.len() - RECENT_LOGS..];
        let first = recent[0].weight;
        if recent.iter().all(|l| l.weight == first) {
            return true;
        }
    }

    days_since(last.date, now) > STALE_LOG_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap()
    }

    fn log(date: DateTime<Utc>, weight: f64, attended: bool, size_reduced: bool) -> LogEntry {
        let mut entry = LogEntry::new(date);
        entry.weight = Some(weight);
        entry.attended = attended;
        entry.size_reduced = size_reduced;
        entry
    }

    #[test]
    fn test_bmi() {
        assert_eq!(bmi(70.0, 175.0).unwrap(), 22.9);
        assert_eq!(bmi(70.0, 175.0).unwrap(), bmi(70.0, 175.0).unwrap());
        assert!(matches!(bmi(70.0, 0.0), Err(Error::MissingInput(_))));
        assert!(matches!(bmi(70.0, -3.0), Err(Error::MissingInput(_))));
    }

    #[test]
    fn test_user_bmi_requires_height() {
        let mut user = User::new("A");
        user.logs.push(log(at(2025, 1, 1), 80.0, true, false));
        assert!(matches!(user_bmi(&user), Err(Error::MissingInput(_))));
        user.height = Some(170.0);
        assert_eq!(user_bmi(&user).unwrap(), 27.7);
    }

    #[test]
    fn test_progress_is_capped() {
        let start = at(2024, 1, 1);
        for days in [0, 30, 59, 60, 61, 400, 10_000] {
            let now = start + Duration::days(days);
            assert!(program_progress_percent(start, ProgramType::SixtyDay, now) <= 100);
        }
        assert_eq!(program_progress_percent(start, ProgramType::SixtyDay, start + Duration::days(30)), 50);
        assert_eq!(program_progress_percent(start, ProgramType::NinetyDay, start + Duration::days(45)), 50);
        // Start in the future counts as no progress
        assert_eq!(program_progress_percent(start, ProgramType::SixtyDay, start - Duration::days(5)), 0);
    }

    #[test]
    fn test_recommended_calories_male_moderate() {
        // BMR 1648.75 -> x1.55 = 2555.56 -> -500 = 2055.56
        let kcal = recommended_calories(70.0, 175.0, 30, Gender::Male, CalorieParams::default());
        assert_eq!(kcal, 2056);
    }

    #[test]
    fn test_member_with_blank_age_has_no_calorie_target() {
        let mut user: User = serde_json::from_str(
            r#"{"id": "user_1", "name": "A", "age": 0, "height": 175, "gender": "Male"}"#,
        )
        .unwrap();
        user.logs.push(log(at(2025, 1, 1), 70.0, true, false));
        let params = CalorieParams::default();
        assert!(matches!(
            user_recommended_calories(&user, params),
            Err(Error::MissingInput(_))
        ));

        user.age = Some(30);
        assert_eq!(user_recommended_calories(&user, params).unwrap(), 2056);
    }

    #[test]
    fn test_recommended_calories_female_constant() {
        let params = CalorieParams {
            activity_factor: 1.0,
            deficit: 0.0,
        };
        // 600 + 1000 - 150 - 161
        assert_eq!(recommended_calories(60.0, 160.0, 30, Gender::Female, params), 1289);
        assert_eq!(recommended_calories(60.0, 160.0, 30, Gender::Unspecified, params), 1289);
    }

    #[test]
    fn test_weight_loss_uses_insertion_order() {
        let logs = vec![
            log(at(2025, 1, 1), 82.0, true, false),
            log(at(2025, 1, 10), 79.5, true, false),
        ];
        assert_eq!(weight_loss(&logs).unwrap(), 2.5);
        assert!(matches!(weight_loss(&[]), Err(Error::MissingInput(_))));
    }

    #[test]
    fn test_attendance_rate() {
        assert_eq!(attendance_rate(&[]), None);
        let logs = vec![
            log(at(2025, 1, 1), 80.0, true, false),
            log(at(2025, 1, 2), 80.0, false, false),
            log(at(2025, 1, 3), 80.0, true, false),
            log(at(2025, 1, 4), 80.0, true, false),
        ];
        assert_eq!(attendance_rate(&logs), Some(0.75));
        assert_eq!(attendance_percent(&logs), 75);
    }

    #[test]
    fn test_velocity_and_days_to_goal() {
        let start = at(2025, 1, 1);
        let logs = vec![log(start, 84.0, true, false), log(at(2025, 1, 15), 82.0, true, false)];
        let velocity = weight_loss_velocity(&logs, start, at(2025, 1, 15)).unwrap();
        assert!((velocity - 1.0).abs() < 1e-9);
        assert_eq!(weight_loss_velocity(&logs, start, start), None);

        assert_eq!(days_to_goal(82.0, 80.0, 1.0), Some(14));
        assert_eq!(days_to_goal(82.0, 80.0, 0.0), None);
        assert_eq!(days_to_goal(82.0, 80.0, -0.5), None);
        assert_eq!(days_to_goal(79.0, 80.0, 0.0), Some(0));
    }

    #[test]
    fn test_program_day_and_phase() {
        let start = at(2025, 1, 1);
        assert_eq!(program_day(start, ProgramType::SixtyDay, start - Duration::days(1)), 0);
        assert_eq!(program_day(start, ProgramType::SixtyDay, start), 1);
        assert_eq!(program_day(start, ProgramType::SixtyDay, start + Duration::days(200)), 60);

        assert_eq!(training_phase(1), TrainingPhase::LowImpact);
        assert_eq!(training_phase(7), TrainingPhase::RestDay);
        assert_eq!(training_phase(10), TrainingPhase::Mixed);
        assert_eq!(training_phase(30), TrainingPhase::Moderate);
        assert_eq!(training_phase(31), TrainingPhase::LowImpact);
        assert_eq!(training_phase(37), TrainingPhase::RestDay);
    }

    #[test]
    fn test_nutrient_plan() {
        let plan = nutrient_plan(&NutrientInput {
            weight_kg: 70.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            target_weight_kg: 65.0,
            activity: ActivityLevel::Moderate,
            goal: WeightGoal::Lose,
        })
        .unwrap();
        assert_eq!(plan.bmr, 1649);
        assert_eq!(plan.tdee, 2556);
        assert_eq!(plan.target_calories, 2056);
        assert_eq!(plan.protein_g, 154);
        assert_eq!(plan.fat_g, 57);
        assert_eq!(plan.water_ml, 2450);
        assert_eq!(plan.weeks_to_goal, 10);
        assert_eq!(plan.current_bmi, 22.9);
        assert_eq!(plan.target_bmi, 21.2);
    }

    #[test]
    fn test_funnel_categories() {
        assert_eq!(funnel_category(&[log(at(2025, 1, 1), 80.0, true, true)]), FunnelCategory::NoData);

        let lost_and_smaller = vec![
            log(at(2025, 1, 1), 80.0, true, true),
            log(at(2025, 1, 2), 79.0, true, true),
        ];
        assert_eq!(funnel_category(&lost_and_smaller), FunnelCategory::Success);

        let lost_only = vec![
            log(at(2025, 1, 1), 80.0, true, false),
            log(at(2025, 1, 2), 79.0, true, false),
        ];
        assert_eq!(funnel_category(&lost_only), FunnelCategory::NeedsExercise);

        let smaller_only = vec![
            log(at(2025, 1, 1), 80.0, true, true),
            log(at(2025, 1, 2), 80.0, true, true),
        ];
        assert_eq!(funnel_category(&smaller_only), FunnelCategory::NeedsDiet);

        // Exactly half is not more than half
        let half = vec![
            log(at(2025, 1, 1), 80.0, true, true),
            log(at(2025, 1, 2), 80.5, true, false),
        ];
        assert_eq!(funnel_category(&half), FunnelCategory::NoProgress);
    }

    #[test]
    fn test_attendance_streak() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let logs = vec![
            log(at(2025, 1, 7), 80.0, true, false),
            log(at(2025, 1, 8), 80.0, false, false),
            log(at(2025, 1, 9), 80.0, true, false),
            log(at(2025, 1, 10), 80.0, true, false),
        ];
        assert_eq!(attendance_streak(&logs, today), 2);
        assert_eq!(attendance_streak(&logs[..3], today), 0);
        assert_eq!(attendance_streak(&[], today), 0);
    }

    #[test]
    fn test_completion_rate() {
        let mut user = User::new("A");
        user.start_date = Some(at(2025, 1, 1));
        assert_eq!(completion_rate(&user, at(2025, 1, 11)), None);

        for d in 1..=5 {
            user.logs.push(log(at(2025, 1, d), 80.0, true, false));
        }
        assert_eq!(completion_rate(&user, at(2025, 1, 11)), Some(50.0));
        // Day zero still expects one log
        assert_eq!(completion_rate(&user, at(2025, 1, 1)), Some(100.0));
    }

    #[test]
    fn test_needs_attention() {
        let now = at(2025, 1, 10);
        let mut user = User::new("A");
        assert!(needs_attention(&user, now));

        user.logs.push(log(at(2025, 1, 9), 80.0, true, false));
        assert!(!needs_attention(&user, now));
        assert!(needs_attention(&user, at(2025, 1, 14)));

        user.logs = (1..=5).map(|d| log(at(2025, 1, 5 + d), 80.0, true, false)).collect();
        assert!(needs_attention(&user, now));
        user.logs[4].weight = Some(79.6);
        assert!(!needs_attention(&user, now));
    }
}
