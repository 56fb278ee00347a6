//! Integration tests for trimtrack-core services
//!
//! These tests run against a real DuckDB file in a temp directory, plus the
//! in-memory store where a storage quota is needed.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use tempfile::TempDir;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::json;

use trimtrack_core::adapters::{DuckDbStore, MemoryStore};
use trimtrack_core::config::Config;
use trimtrack_core::domain::{
    AppContext, Batch, Gender, Identity, LogEntry, NewUser, ProgramType, Trainer, User,
};
use trimtrack_core::ports::KeyValueStore;
use trimtrack_core::services::metrics::{self, CalorieParams};
use trimtrack_core::services::{scope, CollectionStore, DailyLog, IdStrategy};
use trimtrack_core::{Error, TrimtrackContext};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_store(temp_dir: &TempDir) -> CollectionStore {
    let db_path = temp_dir.path().join("test.duckdb");
    let store = DuckDbStore::open(&db_path).expect("Failed to open store");
    CollectionStore::new(Arc::new(store))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
}

fn member_form(name: &str, trainer: &str, batch_id: Option<&str>) -> NewUser {
    NewUser {
        name: Some(name.to_string()),
        gender: Some(Gender::Female),
        age: Some(32),
        current_weight: Some(78.0),
        height: Some(165.0),
        goal_weight: Some(68.0),
        trainer: Some(trainer.to_string()),
        batch_id: batch_id.map(str::to_string),
        ..Default::default()
    }
}

fn patch(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// Derived metrics
// ============================================================================

#[test]
fn test_bmi_is_stable_across_recomputation() {
    assert_eq!(metrics::bmi(70.0, 175.0).unwrap(), 22.9);

    let mut user = User::new("Stable");
    user.height = Some(175.0);
    let mut log = LogEntry::new(now());
    log.weight = Some(70.0);
    user.logs.push(log);

    let first = metrics::user_bmi(&user).unwrap();
    for _ in 0..3 {
        assert_eq!(metrics::user_bmi(&user).unwrap(), first);
    }
}

#[test]
fn test_progress_never_exceeds_100() {
    for years in [1, 5, 50] {
        let start = now() - Duration::days(365 * years);
        assert_eq!(
            metrics::program_progress_percent(start, ProgramType::SixtyDay, now()),
            100
        );
    }
}

/// Mifflin-St Jeor for 70 kg, 175 cm, 30 years, male:
/// BMR 1648.75, x1.55 = 2555.56, -500 = 2056 kcal
#[test]
fn test_recommended_calories_reference_member() {
    let kcal = metrics::recommended_calories(70.0, 175.0, 30, Gender::Male, CalorieParams::default());
    assert_eq!(kcal, 2056);
}

#[test]
fn test_missing_height_is_missing_input() {
    let user = User::new("No height");
    assert!(matches!(metrics::user_bmi(&user), Err(Error::MissingInput(_))));
}

// ============================================================================
// Collection store against DuckDB
// ============================================================================

#[test]
fn test_add_then_read_returns_one_more_record() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    store.add(User::new("Existing"), IdStrategy::Random).unwrap();
    let before: Vec<User> = store.get_all().unwrap();

    let mut user = User::new("Priya");
    user.height = Some(160.0);
    user.trainer = Some("Trainer B".to_string());
    user.extra.insert("phone".to_string(), json!("555-0101"));
    let added = store.add(user, IdStrategy::Random).unwrap();

    let after: Vec<User> = store.get_all().unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let read_back = after.iter().find(|u| u.id == added.id).unwrap();
    assert_eq!(read_back, &added);
    assert_eq!(read_back.extra.get("phone"), Some(&json!("555-0101")));
}

#[test]
fn test_delete_missing_id_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    store.add(User::new("Amit"), IdStrategy::Random).unwrap();

    assert!(!store.remove::<User>("user_does_not_exist").unwrap());
    assert_eq!(store.get_all::<User>().unwrap().len(), 1);
}

#[test]
fn test_sequential_updates_merge() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let user = store.add(User::new("Amit"), IdStrategy::Random).unwrap();

    store.update::<User>(&user.id, patch(json!({"a": 1}))).unwrap();
    let merged: User = store.update(&user.id, patch(json!({"b": 2}))).unwrap();

    assert_eq!(merged.extra.get("a"), Some(&json!(1)));
    assert_eq!(merged.extra.get("b"), Some(&json!(2)));
    assert_eq!(merged.name, "Amit");
}

#[test]
fn test_update_missing_id_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let result = store.update::<User>("user_missing", patch(json!({"a": 1})));
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let store = create_test_store(&temp_dir);
        store.add(User::new("Durable"), IdStrategy::Random).unwrap().id
    };
    let store = create_test_store(&temp_dir);
    let user: User = store.require(&id).unwrap();
    assert_eq!(user.name, "Durable");
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_batch_then_trainer_scope() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let batch = store
        .add(
            Batch::new("Spring 2025", now(), now() + Duration::days(60)),
            IdStrategy::Random,
        )
        .unwrap();

    for (name, trainer, in_batch) in [
        ("Amit", "Trainer A", true),
        ("Priya", "Trainer B", true),
        ("Rahul", "Trainer A", false),
    ] {
        let mut user = User::new(name);
        user.trainer = Some(trainer.to_string());
        if in_batch {
            user.batch_id = Some(batch.id.clone());
        }
        store.add(user, IdStrategy::Random).unwrap();
    }

    let users: Vec<User> = store.get_all().unwrap();
    let in_batch = scope::batch_scope(users, Some(&batch.id));
    assert_eq!(in_batch.len(), 2);

    let owned = scope::trainer_scope(in_batch, &Identity::trainer("Trainer A"));
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].name, "Amit");
}

// ============================================================================
// Storage failures
// ============================================================================

#[test]
fn test_quota_failure_leaves_prior_state() {
    let medium = Arc::new(MemoryStore::with_quota(600));
    let store = CollectionStore::new(medium.clone());
    let first = store.add(User::new("Fits"), IdStrategy::Random).unwrap();
    let stored_before = medium.get("weightloss_users").unwrap();

    let mut big = User::new("Too big");
    big.extra.insert("notesDump".to_string(), json!("x".repeat(2_000)));
    let result = store.add(big, IdStrategy::Random);

    assert!(matches!(result, Err(Error::Storage(_))));
    assert_eq!(medium.get("weightloss_users").unwrap(), stored_before);
    let users: Vec<User> = store.get_all().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, first.id);
}

// ============================================================================
// End to end through the context
// ============================================================================

#[test]
fn test_context_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = TrimtrackContext::with_store(
        Config::default(),
        temp_dir.path(),
        Arc::new(DuckDbStore::open(&temp_dir.path().join("trimtrack.duckdb")).unwrap()),
    );

    ctx.trainer_service.add(Trainer::new("Trainer A")).unwrap();
    let batch = ctx
        .batch_service
        .add(Batch::new("Spring 2025", now(), now() + Duration::days(60)))
        .unwrap();
    ctx.batch_service.activate(&batch.id).unwrap();

    let amit = ctx
        .user_service
        .add(member_form("Amit Patel", "Trainer A", Some(&batch.id)), now())
        .unwrap();
    let priya = ctx
        .user_service
        .add(member_form("Priya Sharma", "Trainer B", Some(&batch.id)), now())
        .unwrap();
    assert_eq!(amit.id, "spring_2025_user_001");
    assert_eq!(priya.id, "spring_2025_user_002");

    let day2 = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
    ctx.user_service
        .log_day(
            &amit.id,
            day2,
            DailyLog {
                weight: Some(77.0),
                attended: true,
                ..Default::default()
            },
        )
        .unwrap();
    ctx.attendance_service.mark(&priya.id, day2, false).unwrap();

    // Admin with the active batch sees both
    let app = ctx.app_context().unwrap();
    assert_eq!(app.active_batch_id.as_deref(), Some(batch.id.as_str()));
    let stats = ctx.attendance_service.stats(&app, day2).unwrap();
    assert_eq!((stats.attended, stats.absent), (1, 1));

    // Trainer A sees only Amit
    let trainer_a = ctx
        .trainer_service
        .list()
        .unwrap()
        .into_iter()
        .find(|t| t.name == "Trainer A")
        .unwrap();
    ctx.session_service.login_as_trainer(&trainer_a.id).unwrap();
    let app = ctx.app_context().unwrap();
    let visible = ctx.user_service.list(&app).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, amit.id);

    let later = now() + Duration::days(1);
    let report = ctx.report_service.weekly(&app, later).unwrap();
    assert_eq!(report.total_users, 1);
    assert_eq!(report.avg_weight_loss, 1.0);

    ctx.session_service.logout().unwrap();
    let overview = ctx
        .report_service
        .overview(&ctx.app_context().unwrap(), later)
        .unwrap();
    assert_eq!(overview.total, 2);
    assert_eq!(overview.on_track, 2);
}

#[test]
fn test_context_opens_configured_database() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = TrimtrackContext::new(temp_dir.path()).unwrap();
        ctx.trainer_service.add(Trainer::new("Trainer A")).unwrap();
    }
    assert!(temp_dir.path().join("trimtrack.duckdb").exists());

    let ctx = TrimtrackContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.trainer_service.list().unwrap().len(), 1);
    assert!(ctx.app_context().unwrap().identity.is_admin());
    assert_eq!(AppContext::admin().identity, ctx.app_context().unwrap().identity);
}
