//! Dashboard reports over the scoped roster

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dates::days_since;
use crate::domain::result::Result;
use crate::domain::{AppContext, ProgressStatus, User};
use crate::services::collection::CollectionStore;
use crate::services::metrics::{self, CalorieParams, FunnelCategory};
use crate::services::scope;

/// Days since the last log within which a member counts as active
const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Length of the top-performer and needs-attention lists
const SHORTLIST: usize = 5;

/// Headline counts for the overview page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub struggling: usize,
    /// Mean share of the program elapsed, whole percent
    pub average_progress: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub user_id: String,
    pub name: String,
    pub weight_loss: f64,
    pub loss_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionItem {
    pub user_id: String,
    pub name: String,
    /// Days since the last log; `None` when there is no log at all
    pub days_since_log: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelBucket {
    pub category: FunnelCategory,
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub total_users: usize,
    pub active_users: usize,
    /// Mean kg lost by members with two or more logs
    pub avg_weight_loss: f64,
    /// Mean log completion over members with logs, whole percent
    pub completion_rate: u32,
    pub top_performers: Vec<Performer>,
    pub needs_attention: Vec<AttentionItem>,
    pub funnel: Vec<FunnelBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieRow {
    pub user_id: String,
    pub name: String,
    /// Total calories of the latest log
    pub consumed: u32,
    /// `None` when the profile lacks height or age
    pub recommended: Option<u32>,
    pub bmi: Option<f64>,
}

impl CalorieRow {
    pub fn within_target(&self) -> bool {
        self.recommended.is_some_and(|r| self.consumed <= r)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieComparison {
    pub rows: Vec<CalorieRow>,
    pub avg_recommended: u32,
    pub avg_consumed: u32,
    /// Members at or under target, over members with a target
    pub within_target_percent: u32,
}

pub struct ReportService {
    store: CollectionStore,
    calories: CalorieParams,
}

impl ReportService {
    pub fn new(store: CollectionStore, calories: CalorieParams) -> Self {
        Self { store, calories }
    }

    fn scoped(&self, ctx: &AppContext) -> Result<Vec<User>> {
        Ok(scope::scope_users(self.store.get_all::<User>()?, ctx))
    }

    pub fn overview(&self, ctx: &AppContext, now: DateTime<Utc>) -> Result<Overview> {
        Ok(overview(&self.scoped(ctx)?, now))
    }

    pub fn weekly(&self, ctx: &AppContext, now: DateTime<Utc>) -> Result<WeeklyReport> {
        Ok(weekly_report(&self.scoped(ctx)?, now))
    }

    pub fn calories(&self, ctx: &AppContext) -> Result<CalorieComparison> {
        Ok(calorie_comparison(&self.scoped(ctx)?, self.calories))
    }
}

pub fn overview(users: &[User], now: DateTime<Utc>) -> Overview {
    let count = |status: ProgressStatus| {
        users
            .iter()
            .filter(|u| u.progress_status == Some(status))
            .count()
    };

    let average_progress = if users.is_empty() {
        0
    } else {
        let sum: u32 = users
            .iter()
            .map(|u| {
                u.program_start()
                    .map(|start| metrics::program_progress_percent(start, u.program_type, now))
                    .unwrap_or(0)
            })
            .sum();
        (f64::from(sum) / users.len() as f64).round() as u32
    };

    Overview {
        total: users.len(),
        on_track: count(ProgressStatus::OnTrack),
        at_risk: count(ProgressStatus::AtRisk),
        struggling: count(ProgressStatus::Struggling),
        average_progress,
    }
}

pub fn weekly_report(users: &[User], now: DateTime<Utc>) -> WeeklyReport {
    let active_users = users
        .iter()
        .filter(|u| {
            u.latest_log()
                .is_some_and(|l| days_since(l.date, now) <= ACTIVE_WINDOW_DAYS)
        })
        .count();

    let losses: Vec<(&User, f64)> = users
        .iter()
        .filter(|u| u.logs.len() >= 2)
        .filter_map(|u| metrics::weight_loss(&u.logs).ok().map(|loss| (u, loss)))
        .collect();
    let avg_weight_loss = if losses.is_empty() {
        0.0
    } else {
        metrics::round1(losses.iter().map(|(_, l)| l).sum::<f64>() / losses.len() as f64)
    };

    let rates: Vec<f64> = users
        .iter()
        .filter_map(|u| metrics::completion_rate(u, now))
        .collect();
    let completion_rate = if rates.is_empty() {
        0
    } else {
        (rates.iter().sum::<f64>() / rates.len() as f64).round() as u32
    };

    let mut top_performers: Vec<Performer> = losses
        .iter()
        .map(|(u, loss)| {
            let days = u.program_start().map(|s| days_since(s, now)).unwrap_or(0);
            Performer {
                user_id: u.id.clone(),
                name: u.name.clone(),
                weight_loss: metrics::round1(*loss),
                loss_per_day: if days > 0 { loss / days as f64 } else { 0.0 },
            }
        })
        .collect();
    top_performers.sort_by(|a, b| b.weight_loss.total_cmp(&a.weight_loss));
    top_performers.truncate(SHORTLIST);

    let needs_attention = users
        .iter()
        .filter(|u| metrics::needs_attention(u, now))
        .take(SHORTLIST)
        .map(|u| AttentionItem {
            user_id: u.id.clone(),
            name: u.name.clone(),
            days_since_log: u.latest_log().map(|l| days_since(l.date, now)),
        })
        .collect();

    WeeklyReport {
        total_users: users.len(),
        active_users,
        avg_weight_loss,
        completion_rate,
        top_performers,
        needs_attention,
        funnel: funnel(users),
    }
}

/// Members per funnel category, in display order
pub fn funnel(users: &[User]) -> Vec<FunnelBucket> {
    FunnelCategory::ALL
        .iter()
        .map(|&category| {
            let count = users
                .iter()
                .filter(|u| metrics::funnel_category(&u.logs) == category)
                .count();
            let percent = if users.is_empty() {
                0
            } else {
                (count as f64 / users.len() as f64 * 100.0).round() as u32
            };
            FunnelBucket {
                category,
                count,
                percent,
            }
        })
        .collect()
}

/// Latest intake against the recommended target, members with logs only
pub fn calorie_comparison(users: &[User], params: CalorieParams) -> CalorieComparison {
    let rows: Vec<CalorieRow> = users
        .iter()
        .filter_map(|u| {
            let latest = u.latest_log()?;
            Some(CalorieRow {
                user_id: u.id.clone(),
                name: u.name.clone(),
                consumed: latest.total_calories,
                recommended: metrics::user_recommended_calories(u, params).ok(),
                bmi: latest.bmi.or(u.bmi),
            })
        })
        .collect();

    let targets: Vec<&CalorieRow> = rows.iter().filter(|r| r.recommended.is_some()).collect();
    let avg = |values: Vec<u32>| -> u32 {
        if values.is_empty() {
            0
        } else {
            (values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64).round() as u32
        }
    };
    let avg_recommended = avg(targets.iter().filter_map(|r| r.recommended).collect());
    let avg_consumed = avg(rows.iter().map(|r| r.consumed).collect());
    let within_target_percent = if targets.is_empty() {
        0
    } else {
        let within = targets.iter().filter(|r| r.within_target()).count();
        (within as f64 / targets.len() as f64 * 100.0).round() as u32
    };

    CalorieComparison {
        rows,
        avg_recommended,
        avg_consumed,
        within_target_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, LogEntry};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap()
    }

    fn member(name: &str, weights: &[f64], reduced: bool) -> User {
        let mut user = User::new(name);
        user.id = format!("user_{name}");
        user.height = Some(170.0);
        user.age = Some(30);
        user.gender = Some(Gender::Male);
        user.start_date = Some(now() - Duration::days(10));
        for (i, w) in weights.iter().enumerate() {
            let mut log = LogEntry::new(now() - Duration::days((weights.len() - 1 - i) as i64));
            log.weight = Some(*w);
            log.attended = true;
            log.size_reduced = reduced;
            user.logs.push(log);
        }
        user
    }

    #[test]
    fn test_overview_counts_and_progress() {
        let mut a = member("a", &[80.0], false);
        a.progress_status = Some(ProgressStatus::OnTrack);
        let mut b = member("b", &[80.0], false);
        b.progress_status = Some(ProgressStatus::AtRisk);
        b.start_date = Some(now() - Duration::days(30));

        let o = overview(&[a, b], now());
        assert_eq!(o.total, 2);
        assert_eq!(o.on_track, 1);
        assert_eq!(o.at_risk, 1);
        // 10/60 -> 17%, 30/60 -> 50%
        assert_eq!(o.average_progress, 34);
    }

    #[test]
    fn test_weekly_report() {
        let users = vec![
            member("lost", &[90.0, 88.0, 86.0], true),
            member("flat", &[80.0, 80.0], false),
            member("none", &[], false),
        ];
        let report = weekly_report(&users, now());

        assert_eq!(report.total_users, 3);
        assert_eq!(report.active_users, 2);
        assert_eq!(report.avg_weight_loss, 2.0);
        assert_eq!(report.top_performers[0].name, "lost");
        assert_eq!(report.top_performers[0].weight_loss, 4.0);
        assert_eq!(report.needs_attention.len(), 1);
        assert_eq!(report.needs_attention[0].days_since_log, None);

        let count = |c| report.funnel.iter().find(|b| b.category == c).unwrap().count;
        assert_eq!(count(FunnelCategory::Success), 1);
        assert_eq!(count(FunnelCategory::NoProgress), 1);
        assert_eq!(count(FunnelCategory::NoData), 1);
    }

    #[test]
    fn test_calorie_comparison() {
        let mut a = member("a", &[80.0], false);
        a.logs[0].total_calories = 1800;
        let mut b = member("b", &[80.0], false);
        b.logs[0].total_calories = 2600;
        let mut c = member("c", &[80.0], false);
        c.age = None;
        let d = member("d", &[], false);

        let cmp = calorie_comparison(&[a, b, c, d], CalorieParams::default());
        assert_eq!(cmp.rows.len(), 3);
        assert_eq!(cmp.rows[0].recommended, Some(2162));
        assert_eq!(cmp.rows[2].recommended, None);
        assert_eq!(cmp.within_target_percent, 50);
    }
}
