//! Exercise library, groups, the weekly plan and per-batch overrides

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::dates::{self, days_since};
use crate::domain::result::{Error, Result};
use crate::domain::{Batch, BatchAssignment, Collection, Exercise, ExerciseGroup, WeeklyAssignment};
use crate::services::collection::{random_id, CollectionStore, IdStrategy};
use crate::services::scope;

/// A plan slot with its group resolved
///
/// `group` is `None` when the assignment points at a group that no longer
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedWeek {
    pub week_number: u32,
    pub group_id: String,
    pub group: Option<ExerciseGroup>,
}

/// A group's exercises, split into those found and dangling ids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGroup {
    pub exercises: Vec<Exercise>,
    pub missing: Vec<String>,
}

pub struct ExerciseService {
    store: CollectionStore,
}

impl ExerciseService {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    // === Library ===

    pub fn list(&self) -> Result<Vec<Exercise>> {
        self.store.get_all()
    }

    pub fn get(&self, id: &str) -> Result<Exercise> {
        self.store.require(id)
    }

    pub fn add(&self, exercise: Exercise) -> Result<Exercise> {
        exercise.validate()?;
        self.store.add(exercise, IdStrategy::Random)
    }

    pub fn edit(&self, id: &str, mut patch: Map<String, Value>, now: DateTime<Utc>) -> Result<Exercise> {
        patch.insert("updatedAt".to_string(), Value::String(dates::format_timestamp(&now)));
        let exercise: Exercise = self.store.merged(id, patch)?;
        exercise.validate()?;
        self.store.save(&exercise)?;
        Ok(exercise)
    }

    /// Copy an exercise under a fresh id with " (Copy)" appended to the name
    pub fn duplicate(&self, id: &str, now: DateTime<Utc>) -> Result<Exercise> {
        let mut copy = self.get(id)?;
        copy.name = format!("{} (Copy)", copy.name);
        copy.created_at = Some(now);
        copy.updated_at = None;
        self.store.add(copy, IdStrategy::Random)
    }

    /// Delete from the library; groups keep the dangling id
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.remove::<Exercise>(id)
    }

    // === Groups ===

    pub fn groups(&self) -> Result<Vec<ExerciseGroup>> {
        self.store.get_all()
    }

    pub fn add_group(&self, group: ExerciseGroup) -> Result<ExerciseGroup> {
        group.validate()?;
        self.store.add(group, IdStrategy::Random)
    }

    pub fn edit_group(
        &self,
        id: &str,
        mut patch: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<ExerciseGroup> {
        patch.insert("updatedAt".to_string(), Value::String(dates::format_timestamp(&now)));
        let group: ExerciseGroup = self.store.merged(id, patch)?;
        group.validate()?;
        self.store.save(&group)?;
        Ok(group)
    }

    /// Delete a group; plan slots pointing at it resolve as missing
    pub fn delete_group(&self, id: &str) -> Result<bool> {
        self.store.remove::<ExerciseGroup>(id)
    }

    /// Exercises of a group, with ids absent from the library reported
    pub fn resolve_group(&self, group_id: &str) -> Result<ResolvedGroup> {
        let group: ExerciseGroup = self.store.require(group_id)?;
        let library = self.list()?;
        let mut resolved = ResolvedGroup::default();
        for id in &group.exercises {
            match library.iter().find(|e| &e.id == id) {
                Some(exercise) => resolved.exercises.push(exercise.clone()),
                None => resolved.missing.push(id.clone()),
            }
        }
        Ok(resolved)
    }

    // === Weekly plan ===

    /// Program-wide plan ordered by week
    pub fn plan(&self) -> Result<Vec<PlannedWeek>> {
        let groups = self.groups()?;
        let mut plan: Vec<PlannedWeek> = self
            .store
            .get_all::<WeeklyAssignment>()?
            .into_iter()
            .map(|a| PlannedWeek {
                group: scope::resolve_group(&a.group_id, &groups).cloned(),
                week_number: a.week_number,
                group_id: a.group_id,
            })
            .collect();
        plan.sort_by_key(|w| w.week_number);
        Ok(plan)
    }

    /// Put `group_id` in `week`, replacing whatever was there
    ///
    /// `None` clears the week without shifting later weeks.
    pub fn assign_week(&self, week: u32, group_id: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        validate_week(week)?;
        let mut assignments: Vec<WeeklyAssignment> = self.store.get_all()?;
        assignments.retain(|a| a.week_number != week);

        if let Some(group_id) = group_id.filter(|g| !g.is_empty()) {
            self.store.require::<ExerciseGroup>(group_id)?;
            assignments.push(WeeklyAssignment {
                id: random_id(Collection::WeeklyAssignments.id_prefix()),
                week_number: week,
                group_id: group_id.to_string(),
                created_at: Some(now),
                extra: Map::new(),
            });
        }
        self.store.put_all(&assignments)
    }

    /// Remove `week` and move every later week down by one
    pub fn remove_week(&self, week: u32) -> Result<bool> {
        let assignments: Vec<WeeklyAssignment> = self.store.get_all()?;
        let before = assignments.len();
        let shifted: Vec<WeeklyAssignment> = assignments
            .into_iter()
            .filter(|a| a.week_number != week)
            .map(|mut a| {
                if a.week_number > week {
                    a.week_number -= 1;
                }
                a
            })
            .collect();
        let removed = shifted.len() < before;
        self.store.put_all(&shifted)?;
        Ok(removed)
    }

    // === Batch overrides ===

    pub fn batch_assignments(&self, batch_id: &str) -> Result<Vec<BatchAssignment>> {
        let mut assignments: Vec<BatchAssignment> = self
            .store
            .get_all::<BatchAssignment>()?
            .into_iter()
            .filter(|a| a.batch_id == batch_id)
            .collect();
        assignments.sort_by_key(|a| a.week_num);
        Ok(assignments)
    }

    pub fn batch_assignment(&self, batch_id: &str, week: u32) -> Result<Option<BatchAssignment>> {
        Ok(self
            .batch_assignments(batch_id)?
            .into_iter()
            .find(|a| a.week_num == week))
    }

    /// Set or clear the group for `(batch_id, week)`
    pub fn assign_batch_week(
        &self,
        batch_id: &str,
        week: u32,
        group_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        validate_week(week)?;
        let mut assignments: Vec<BatchAssignment> = self.store.get_all()?;
        assignments.retain(|a| !(a.batch_id == batch_id && a.week_num == week));

        if let Some(group_id) = group_id.filter(|g| !g.is_empty()) {
            self.store.require::<Batch>(batch_id)?;
            self.store.require::<ExerciseGroup>(group_id)?;
            assignments.push(BatchAssignment {
                batch_id: batch_id.to_string(),
                week_num: week,
                group_id: group_id.to_string(),
                assigned_at: Some(now),
                extra: Map::new(),
            });
        }
        self.store.put_all(&assignments)
    }

    /// The group a batch trains with in its current week, batch override
    /// first, then the program-wide plan
    pub fn group_for_batch_week(&self, batch: &Batch, now: DateTime<Utc>) -> Result<Option<PlannedWeek>> {
        let week = current_week(batch, now);
        if let Some(a) = self.batch_assignment(&batch.id, week)? {
            let groups = self.groups()?;
            return Ok(Some(PlannedWeek {
                group: scope::resolve_group(&a.group_id, &groups).cloned(),
                week_number: week,
                group_id: a.group_id,
            }));
        }
        Ok(self.plan()?.into_iter().find(|w| w.week_number == week))
    }
}

/// Week of the batch containing `now`, 1-based; week 1 before the start
pub fn current_week(batch: &Batch, now: DateTime<Utc>) -> u32 {
    let days = days_since(batch.start_date, now).max(0);
    (days / 7 + 1) as u32
}

fn validate_week(week: u32) -> Result<()> {
    if week == 0 {
        return Err(Error::validation("week numbers start at 1"));
    }
    Ok(())
}
