//! Scoping filters and soft-reference resolution
//!
//! Every roster, report and attendance view goes through `scope_users`, so
//! the batch and trainer partitions are applied the same way everywhere.

use crate::domain::{AppContext, Batch, ExerciseGroup, Identity, Record, Trainer, User};

/// Label shown for a member whose trainer is missing or unknown
pub const UNASSIGNED: &str = "Unassigned";

/// Keep records in the active batch; everything passes when none is active
pub fn batch_scope<T: Record>(records: Vec<T>, active_batch_id: Option<&str>) -> Vec<T> {
    match active_batch_id {
        Some(batch_id) => records
            .into_iter()
            .filter(|r| r.batch_id() == Some(batch_id))
            .collect(),
        None => records,
    }
}

/// Keep members owned by the acting trainer; admins see everyone
///
/// A trainer identity without a name owns nobody.
pub fn trainer_scope(users: Vec<User>, identity: &Identity) -> Vec<User> {
    if identity.is_admin() {
        return users;
    }
    let Some(name) = identity.name.as_deref() else {
        return Vec::new();
    };
    users
        .into_iter()
        .filter(|u| u.trainer.as_deref() == Some(name))
        .collect()
}

/// Batch scope, then trainer scope
pub fn scope_users(users: Vec<User>, ctx: &AppContext) -> Vec<User> {
    let users = batch_scope(users, ctx.active_batch_id.as_deref());
    trainer_scope(users, &ctx.identity)
}

/// The trainer a member names, if one with that exact name exists
pub fn resolve_trainer<'a>(user: &User, trainers: &'a [Trainer]) -> Option<&'a Trainer> {
    let name = user.trainer.as_deref()?;
    trainers.iter().find(|t| t.name == name)
}

/// Trainer name for display, `Unassigned` when missing or dangling
pub fn trainer_label(user: &User, trainers: &[Trainer]) -> String {
    resolve_trainer(user, trainers)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| UNASSIGNED.to_string())
}

/// The batch a member belongs to, if it still exists
pub fn resolve_batch<'a>(user: &User, batches: &'a [Batch]) -> Option<&'a Batch> {
    let id = user.batch_id.as_deref()?;
    batches.iter().find(|b| b.id == id)
}

/// Members owned by a trainer, matched by name
pub fn members_of<'a>(trainer: &Trainer, users: &'a [User]) -> Vec<&'a User> {
    users
        .iter()
        .filter(|u| u.trainer.as_deref() == Some(trainer.name.as_str()))
        .collect()
}

/// An exercise group by id; dangling ids resolve to `None`
pub fn resolve_group<'a>(group_id: &str, groups: &'a [ExerciseGroup]) -> Option<&'a ExerciseGroup> {
    groups.iter().find(|g| g.id == group_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, batch: Option<&str>, trainer: Option<&str>) -> User {
        let mut u = User::new(id);
        u.id = id.to_string();
        u.batch_id = batch.map(str::to_string);
        u.trainer = trainer.map(str::to_string);
        u
    }

    fn roster() -> Vec<User> {
        vec![
            user("u1", Some("B"), Some("Trainer A")),
            user("u2", Some("B"), Some("Trainer B")),
            user("u3", Some("C"), Some("Trainer A")),
        ]
    }

    #[test]
    fn test_batch_then_trainer_scope() {
        let in_batch = batch_scope(roster(), Some("B"));
        assert_eq!(in_batch.len(), 2);

        let ctx = AppContext::new(Identity::trainer("Trainer A")).with_active_batch("B");
        let scoped = scope_users(roster(), &ctx);
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "u1");
    }

    #[test]
    fn test_admin_without_batch_sees_everyone() {
        assert_eq!(scope_users(roster(), &AppContext::admin()).len(), 3);
    }

    #[test]
    fn test_trainer_without_name_sees_nobody() {
        let identity = Identity {
            role: crate::domain::Role::Trainer,
            ..Default::default()
        };
        assert!(trainer_scope(roster(), &identity).is_empty());
    }

    #[test]
    fn test_dangling_trainer_is_unassigned() {
        let trainers = vec![Trainer::new("Trainer A")];
        let users = roster();
        assert_eq!(trainer_label(&users[0], &trainers), "Trainer A");
        assert_eq!(trainer_label(&users[1], &trainers), UNASSIGNED);
        assert_eq!(members_of(&trainers[0], &users).len(), 2);
    }
}
