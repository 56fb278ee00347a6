//! Class attendance: marking, undo, per-day statistics, CSV export

use std::collections::HashSet;
use std::io::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::start_of_day;
use crate::domain::record::keys;
use crate::domain::result::Result;
use crate::domain::{AppContext, LogEntry, Trainer, User};
use crate::services::collection::CollectionStore;
use crate::services::users::refresh_memos;
use crate::services::{metrics, scope};

/// Log histories as they were before a mark, for undo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSnapshot {
    pub day: NaiveDate,
    pub previous: Vec<(String, Vec<LogEntry>)>,
}

impl AttendanceSnapshot {
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}

/// One member's attendance on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAttendance {
    pub user_id: String,
    pub name: String,
    pub has_log: bool,
    pub attended: bool,
}

/// Attendance counts for one day over the scoped roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total: usize,
    pub attended: usize,
    pub absent: usize,
    pub no_log: usize,
    /// Attended over total, whole percent
    pub percentage: u32,
}

/// A row of the attendance export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Trainer")]
    pub trainer: String,
    #[serde(rename = "Program")]
    pub program: String,
    #[serde(rename = "Total Days")]
    pub total_days: usize,
    #[serde(rename = "Days Attended")]
    pub days_attended: usize,
    #[serde(rename = "Days Absent")]
    pub days_absent: usize,
    #[serde(rename = "Attendance %")]
    pub attendance_percent: u32,
    #[serde(rename = "Streak")]
    pub streak: u32,
}

pub struct AttendanceService {
    store: CollectionStore,
}

impl AttendanceService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    /// Mark one member
    pub fn mark(&self, user_id: &str, day: NaiveDate, attended: bool) -> Result<AttendanceSnapshot> {
        self.mark_many(&[user_id.to_string()], day, attended)
    }

    /// Mark several members in one write
    ///
    /// The day's entry is updated if present. Otherwise a new entry is
    /// appended carrying the last known weight forward. Unknown ids are
    /// skipped with a diagnostic and repeated ids are marked once. The
    /// returned snapshot undoes the change and is also kept as the last mark
    /// for `undo_last`.
    pub fn mark_many(
        &self,
        user_ids: &[String],
        day: NaiveDate,
        attended: bool,
    ) -> Result<AttendanceSnapshot> {
        let mut users = self.store.get_all::<User>()?;
        let mut previous = Vec::new();
        let mut changed = Vec::new();
        let mut seen = HashSet::new();

        for id in user_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            let Some(user) = users.iter_mut().find(|u| &u.id == id) else {
                tracing::warn!(id = %id, "attendance: no member with this id");
                continue;
            };
            previous.push((user.id.clone(), user.logs.clone()));
            apply_mark(user, day, attended);
            changed.push(user.clone());
        }

        self.store.save_many(&changed)?;
        let snapshot = AttendanceSnapshot { day, previous };
        if let Err(e) = self.store.set_json(keys::LAST_ATTENDANCE_MARK, &snapshot) {
            tracing::warn!(error = %e, "attendance marked but the undo snapshot was not kept");
        }
        Ok(snapshot)
    }

    /// The snapshot `undo_last` would restore, if any
    pub fn last_mark(&self) -> Result<Option<AttendanceSnapshot>> {
        self.store.get_json(keys::LAST_ATTENDANCE_MARK)
    }

    /// Undo the most recent mark; `None` when there is nothing to undo
    ///
    /// A mark can be undone once.
    pub fn undo_last(&self) -> Result<Option<(NaiveDate, usize)>> {
        let Some(snapshot) = self.last_mark()? else {
            return Ok(None);
        };
        let restored = self.undo(&snapshot)?;
        self.store.remove_scalar(keys::LAST_ATTENDANCE_MARK)?;
        Ok(Some((snapshot.day, restored)))
    }

    /// Restore the log histories captured by a mark
    pub fn undo(&self, snapshot: &AttendanceSnapshot) -> Result<usize> {
        let mut restored = Vec::new();
        for (id, logs) in &snapshot.previous {
            let Some(mut user) = self.store.get::<User>(id)? else {
                tracing::warn!(id = %id, "undo: member no longer exists");
                continue;
            };
            user.logs = logs.clone();
            refresh_memos(&mut user);
            restored.push(user);
        }
        self.store.save_many(&restored)
    }

    /// Attendance of every scoped member on `day`
    pub fn for_day(&self, ctx: &AppContext, day: NaiveDate) -> Result<Vec<DayAttendance>> {
        let users = scope::scope_users(self.store.get_all::<User>()?, ctx);
        Ok(users
            .iter()
            .map(|u| {
                let log = u.log_for_day(day);
                DayAttendance {
                    user_id: u.id.clone(),
                    name: u.name.clone(),
                    has_log: log.is_some(),
                    attended: log.is_some_and(|l| l.attended),
                }
            })
            .collect())
    }

    pub fn stats(&self, ctx: &AppContext, day: NaiveDate) -> Result<AttendanceStats> {
        Ok(day_stats(&self.for_day(ctx, day)?))
    }

    /// Consecutive attended days ending on `today`
    pub fn streak(&self, user_id: &str, today: NaiveDate) -> Result<u32> {
        let user: User = self.store.require(user_id)?;
        Ok(metrics::attendance_streak(&user.logs, today))
    }

    /// Export rows for the scoped roster
    pub fn rows(&self, ctx: &AppContext, today: NaiveDate) -> Result<Vec<AttendanceRow>> {
        let trainers = self.store.get_all::<Trainer>()?;
        let users = scope::scope_users(self.store.get_all::<User>()?, ctx);
        Ok(users
            .iter()
            .map(|u| {
                let attended = u.logs.iter().filter(|l| l.attended).count();
                AttendanceRow {
                    name: u.name.clone(),
                    trainer: scope::trainer_label(u, &trainers),
                    program: u.program_type.as_str().to_string(),
                    total_days: u.logs.len(),
                    days_attended: attended,
                    days_absent: u.logs.len() - attended,
                    attendance_percent: metrics::attendance_percent(&u.logs),
                    streak: metrics::attendance_streak(&u.logs, today),
                }
            })
            .collect())
    }

    /// Write the scoped roster as CSV; returns the number of rows
    pub fn export_csv<W: Write>(&self, ctx: &AppContext, today: NaiveDate, out: W) -> Result<usize> {
        let rows = self.rows(ctx, today)?;
        let mut writer = csv::Writer::from_writer(out);
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }
}

fn apply_mark(user: &mut User, day: NaiveDate, attended: bool) {
    match user.log_for_day_mut(day) {
        Some(entry) => entry.attended = attended,
        None => {
            let mut entry = LogEntry::new(start_of_day(day));
            entry.weight = user.current_weight();
            entry.bmi = user.bmi;
            entry.attended = attended;
            user.logs.push(entry);
        }
    }
    refresh_memos(user);
}

/// Counts over one day's attendance list
pub fn day_stats(day: &[DayAttendance]) -> AttendanceStats {
    let total = day.len();
    let attended = day.iter().filter(|a| a.has_log && a.attended).count();
    let absent = day.iter().filter(|a| a.has_log && !a.attended).count();
    let no_log = day.iter().filter(|a| !a.has_log).count();
    let percentage = if total > 0 {
        (attended as f64 / total as f64 * 100.0).round() as u32
    } else {
        0
    };
    AttendanceStats {
        total,
        attended,
        absent,
        no_log,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::NewUser;
    use crate::services::UserService;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn setup() -> (UserService, AttendanceService, Vec<String>) {
        let store = CollectionStore::new(Arc::new(MemoryStore::new()));
        let users = UserService::new(store.clone());
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        let ids = ["Amit", "Priya", "Rahul"]
            .iter()
            .map(|name| {
                users
                    .add(
                        NewUser {
                            name: Some(name.to_string()),
                            current_weight: Some(80.0),
                            height: Some(170.0),
                            goal_weight: Some(70.0),
                            ..Default::default()
                        },
                        now,
                    )
                    .unwrap()
                    .id
            })
            .collect();
        (users, AttendanceService::new(store), ids)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_mark_creates_entry_with_carried_weight() {
        let (users, attendance, ids) = setup();
        attendance.mark(&ids[0], day(11), false).unwrap();

        let user = users.get(&ids[0]).unwrap();
        assert_eq!(user.logs.len(), 2);
        assert_eq!(user.logs[1].weight, Some(80.0));
        assert!(!user.logs[1].attended);
        assert_eq!(user.skipped_classes, 1);
    }

    #[test]
    fn test_mark_updates_existing_entry() {
        let (users, attendance, ids) = setup();
        attendance.mark(&ids[0], day(10), false).unwrap();
        let user = users.get(&ids[0]).unwrap();
        assert_eq!(user.logs.len(), 1);
        assert!(!user.logs[0].attended);
    }

    #[test]
    fn test_bulk_mark_and_undo() {
        let (users, attendance, ids) = setup();
        let mut targets = ids[..2].to_vec();
        targets.push("user_missing".to_string());

        let snapshot = attendance.mark_many(&targets, day(11), true).unwrap();
        assert_eq!(snapshot.previous.len(), 2);
        assert_eq!(users.get(&ids[1]).unwrap().logs.len(), 2);

        assert_eq!(attendance.undo(&snapshot).unwrap(), 2);
        assert_eq!(users.get(&ids[1]).unwrap().logs.len(), 1);
    }

    #[test]
    fn test_repeated_ids_mark_once_and_undo_cleanly() {
        let (users, attendance, ids) = setup();
        let targets = vec![ids[0].clone(), ids[0].clone()];

        let snapshot = attendance.mark_many(&targets, day(11), true).unwrap();
        assert_eq!(snapshot.previous.len(), 1);
        assert_eq!(users.get(&ids[0]).unwrap().logs.len(), 2);

        attendance.undo(&snapshot).unwrap();
        assert_eq!(users.get(&ids[0]).unwrap().logs.len(), 1);
    }

    #[test]
    fn test_undo_last_restores_latest_mark_once() {
        let (users, attendance, ids) = setup();
        assert_eq!(attendance.undo_last().unwrap(), None);

        attendance.mark(&ids[0], day(11), true).unwrap();
        attendance.mark(&ids[0], day(10), false).unwrap();

        assert_eq!(attendance.undo_last().unwrap(), Some((day(10), 1)));
        let user = users.get(&ids[0]).unwrap();
        assert_eq!(user.logs.len(), 2);
        assert!(user.logs[0].attended);

        assert_eq!(attendance.undo_last().unwrap(), None);
    }

    #[test]
    fn test_stats_for_day() {
        let (_, attendance, ids) = setup();
        attendance.mark(&ids[0], day(11), true).unwrap();
        attendance.mark(&ids[1], day(11), false).unwrap();

        let stats = attendance.stats(&AppContext::admin(), day(11)).unwrap();
        assert_eq!(
            stats,
            AttendanceStats {
                total: 3,
                attended: 1,
                absent: 1,
                no_log: 1,
                percentage: 33,
            }
        );
    }

    #[test]
    fn test_streak_and_csv_export() {
        let (_, attendance, ids) = setup();
        attendance.mark(&ids[0], day(11), true).unwrap();
        assert_eq!(attendance.streak(&ids[0], day(11)).unwrap(), 2);

        let mut out = Vec::new();
        let rows = attendance.export_csv(&AppContext::admin(), day(11), &mut out).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Name,Trainer,Program,Total Days,Days Attended,Days Absent,Attendance %,Streak"
        );
        assert!(text.contains("Amit,Unassigned,60-day,2,2,0,100,2"));
    }
}
