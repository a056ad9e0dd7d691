//! Store-level tests against a temporary SQLite database
//!
//! Covers:
//! - Derived fields persisted on create and partial update
//! - Worker resolution (find-or-create by name, strict lookup by id)
//! - Date range, name and machine filters
//! - Per-machine and rolling three-week aggregates
//! - Worker delete cascading to records

use chrono::NaiveDate;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use loomtrack_common::db::production::{
    create_production, list_production, machine_totals, update_production, weekly_totals,
    ProductionQuery,
};
use loomtrack_common::db::worker_records::{
    create_record, list_records, update_record, RecordQuery,
};
use loomtrack_common::db::workers::{
    create_worker, delete_worker, list_workers, resolve_worker, update_worker,
};
use loomtrack_common::db::{init_database, DateFilter, SortOrder};
use loomtrack_common::derivation::{ProductionDraft, MAX_SAREES_PER_ENTRY};
use loomtrack_common::input::{
    production_from_payload, NewWorker, NewWorkerRecord, ProductionPatch, WorkerPatch,
    WorkerRecordPatch, WorkerRef,
};
use loomtrack_common::lenient::Payload;
use loomtrack_common::time::parse_date_input;
use loomtrack_common::{AttendanceStatus, DayOfWeek, Error, MachineStatus};

/// Test helper: fresh database in a temp dir (dir must outlive the pool)
async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("test.db"))
        .await
        .expect("init database");
    (dir, pool)
}

fn payload(v: Value) -> Payload {
    Payload::from_value(v).unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn add_worker(pool: &SqlitePool, name: &str, salary: f64) -> String {
    create_worker(
        pool,
        &NewWorker {
            name: name.to_string(),
            dob: None,
            daily_salary: salary,
        },
    )
    .await
    .unwrap()
    .id
}

async fn add_record(pool: &SqlitePool, body: Value) -> loomtrack_common::db::WorkerRecord {
    let new = NewWorkerRecord::from_payload(&payload(body)).unwrap();
    create_record(pool, &new).await.unwrap()
}

async fn add_production(pool: &SqlitePool, body: Value) -> loomtrack_common::db::Production {
    let draft = production_from_payload(&payload(body)).unwrap();
    create_production(pool, draft).await.unwrap()
}

// =============================================================================
// Workers and resolution
// =============================================================================

#[tokio::test]
async fn test_record_resolves_existing_worker_case_insensitively() {
    let (_dir, pool) = setup_db().await;
    let rita = add_worker(&pool, "Rita", 300.0).await;

    let rec = add_record(
        &pool,
        json!({"workerName": "rita", "date": "2024-05-06", "status": "Present", "advance": 50}),
    )
    .await;

    assert_eq!(rec.worker_id, rita);
    assert_eq!(rec.worker_name, "Rita");
    assert_eq!(rec.day_of_week, DayOfWeek::Mon);
    assert_eq!(rec.salary_before, 300.0);
    assert_eq!(rec.salary_after, 250.0);
    assert_eq!(rec.net_salary, 250.0);

    let workers = list_workers(&pool).await.unwrap();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].name, "Rita");
}

#[tokio::test]
async fn test_resolution_creates_once_per_name() {
    let (_dir, pool) = setup_db().await;

    let first = resolve_worker(&pool, &WorkerRef::Name("Anita".to_string()), Some(280.0))
        .await
        .unwrap();
    let second = resolve_worker(&pool, &WorkerRef::Name("anita".to_string()), None)
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Anita");
    assert_eq!(second.salary_before, 280.0);
    assert_eq!(list_workers(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolution_is_anchored_not_substring() {
    let (_dir, pool) = setup_db().await;
    add_worker(&pool, "Anitha", 100.0).await;

    let resolved = resolve_worker(&pool, &WorkerRef::Name("Anit".to_string()), None)
        .await
        .unwrap();
    assert!(resolved.created);
    assert_eq!(list_workers(&pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_resolution_by_unknown_id_is_not_found() {
    let (_dir, pool) = setup_db().await;
    let err = resolve_worker(&pool, &WorkerRef::Id("missing".to_string()), Some(100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(list_workers(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_supplied_salary_overrides_master_salary() {
    let (_dir, pool) = setup_db().await;
    add_worker(&pool, "Rita", 300.0).await;

    let rec = add_record(
        &pool,
        json!({"workerName": "Rita", "date": "2024-05-06", "salaryBefore": 320}),
    )
    .await;
    assert_eq!(rec.salary_before, 320.0);

    // A blank form value falls through to the master salary
    let rec = add_record(
        &pool,
        json!({"workerName": "Rita", "date": "2024-05-06", "salaryBefore": ""}),
    )
    .await;
    assert_eq!(rec.salary_before, 300.0);
}

#[tokio::test]
async fn test_leave_record_owes_advance() {
    let (_dir, pool) = setup_db().await;

    let rec = add_record(
        &pool,
        json!({
            "workerName": "Rita", "date": "2024-05-07", "status": "Leave",
            "advance": 50, "salaryBefore": 300
        }),
    )
    .await;

    assert_eq!(rec.status, AttendanceStatus::Leave);
    assert_eq!(rec.day_of_week, DayOfWeek::Tue);
    assert_eq!(rec.salary_after, 0.0);
    assert_eq!(rec.net_salary, -50.0);
}

#[tokio::test]
async fn test_duplicate_worker_day_records_are_allowed() {
    let (_dir, pool) = setup_db().await;
    add_record(&pool, json!({"workerName": "Rita", "date": "2024-05-06"})).await;
    add_record(&pool, json!({"workerName": "Rita", "date": "2024-05-06"})).await;

    let all = list_records(&pool, &RecordQuery::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_record_update_recomputes_with_leave_rule() {
    let (_dir, pool) = setup_db().await;
    add_worker(&pool, "Rita", 300.0).await;
    let rec = add_record(
        &pool,
        json!({"workerName": "Rita", "date": "2024-05-06", "advance": 50}),
    )
    .await;

    let patch = WorkerRecordPatch::from_payload(&payload(json!({"status": "Leave"}))).unwrap();
    let updated = update_record(&pool, &rec.id, &patch).await.unwrap();
    assert_eq!(updated.salary_before, 300.0);
    assert_eq!(updated.salary_after, 0.0);
    assert_eq!(updated.net_salary, -50.0);

    let patch = WorkerRecordPatch::from_payload(&payload(json!({
        "status": "Present", "advanceAmount": 400
    })))
    .unwrap();
    let updated = update_record(&pool, &rec.id, &patch).await.unwrap();
    assert_eq!(updated.salary_after, -100.0);
    assert_eq!(updated.net_salary, -100.0);
}

#[tokio::test]
async fn test_record_update_reassigns_worker() {
    let (_dir, pool) = setup_db().await;
    add_worker(&pool, "Rita", 300.0).await;
    let meena = add_worker(&pool, "Meena", 350.0).await;
    let rec = add_record(&pool, json!({"workerName": "Rita", "date": "2024-05-06"})).await;

    let patch = WorkerRecordPatch::from_payload(&payload(json!({"workerId": meena}))).unwrap();
    let updated = update_record(&pool, &rec.id, &patch).await.unwrap();
    assert_eq!(updated.worker_name, "Meena");
    assert_eq!(updated.salary_before, 350.0);
    assert_eq!(updated.net_salary, 350.0);

    let patch = WorkerRecordPatch::from_payload(&payload(json!({"workerId": "nope"}))).unwrap();
    let err = update_record(&pool, &rec.id, &patch).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_rename_does_not_touch_snapshots() {
    let (_dir, pool) = setup_db().await;
    let id = add_worker(&pool, "Rita", 300.0).await;
    add_record(&pool, json!({"workerId": id, "date": "2024-05-06"})).await;

    let patch = WorkerPatch {
        name: Some("Rita Devi".to_string()),
        ..Default::default()
    };
    update_worker(&pool, &id, &patch).await.unwrap();

    let records = list_records(&pool, &RecordQuery::default()).await.unwrap();
    assert_eq!(records[0].worker_name, "Rita");
    assert_eq!(records[0].worker.as_ref().unwrap().name, "Rita Devi");
}

#[tokio::test]
async fn test_delete_worker_cascades() {
    let (_dir, pool) = setup_db().await;
    let rita = add_worker(&pool, "Rita", 300.0).await;
    add_worker(&pool, "Meena", 350.0).await;
    add_record(&pool, json!({"workerId": rita, "date": "2024-05-06"})).await;
    add_record(&pool, json!({"workerId": rita, "date": "2024-05-07"})).await;
    add_record(&pool, json!({"workerName": "Meena", "date": "2024-05-07"})).await;

    let removed = delete_worker(&pool, &rita).await.unwrap();
    assert_eq!(removed, 2);

    let remaining = list_records(&pool, &RecordQuery::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].worker_name, "Meena");

    let err = delete_worker(&pool, &rita).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

// =============================================================================
// Record queries
// =============================================================================

#[tokio::test]
async fn test_record_name_filter_matches_canonical_or_snapshot() {
    let (_dir, pool) = setup_db().await;
    let id = add_worker(&pool, "Rita", 300.0).await;
    add_record(&pool, json!({"workerId": id, "date": "2024-05-06"})).await;
    add_record(&pool, json!({"workerName": "Meena", "date": "2024-05-06"})).await;

    // Canonical name changes; the old snapshot still matches "rit"
    update_worker(
        &pool,
        &id,
        &WorkerPatch {
            name: Some("Lakshmi".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let by_snapshot = RecordQuery {
        name: Some("RIT".to_string()),
        ..Default::default()
    };
    assert_eq!(list_records(&pool, &by_snapshot).await.unwrap().len(), 1);

    let by_canonical = RecordQuery {
        name: Some("laksh".to_string()),
        ..Default::default()
    };
    assert_eq!(list_records(&pool, &by_canonical).await.unwrap().len(), 1);

    let none = RecordQuery {
        name: Some("zzz".to_string()),
        ..Default::default()
    };
    assert!(list_records(&pool, &none).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_range_is_inclusive_and_sorted() {
    let (_dir, pool) = setup_db().await;
    for date in ["2024-05-05", "2024-05-06", "2024-05-07T18:30", "2024-05-08", "2024-05-09"] {
        add_record(&pool, json!({"workerName": "Rita", "date": date})).await;
    }

    let query = RecordQuery {
        dates: DateFilter::from_params(None, Some("2024-05-06"), Some("2024-05-08")).unwrap(),
        sort: SortOrder::Asc,
        ..Default::default()
    };
    let records = list_records(&pool, &query).await.unwrap();
    let days: Vec<_> = records.iter().map(|r| r.date.date()).collect();
    assert_eq!(days, vec![day("2024-05-06"), day("2024-05-07"), day("2024-05-08")]);

    let query = RecordQuery {
        dates: DateFilter::from_params(Some("2024-05-07"), None, None).unwrap(),
        ..Default::default()
    };
    assert_eq!(list_records(&pool, &query).await.unwrap().len(), 1);

    let newest_first = list_records(&pool, &RecordQuery::default()).await.unwrap();
    assert_eq!(newest_first[0].date.date(), day("2024-05-09"));
}

// =============================================================================
// Production
// =============================================================================

#[tokio::test]
async fn test_machine_off_then_partial_update_keeps_cost() {
    let (_dir, pool) = setup_db().await;

    let entry = add_production(
        &pool,
        json!({
            "machineId": "LM-01", "date": "2024-05-06", "machineStatus": "OFF",
            "sareesProduced": 40, "costPerSaree": 10
        }),
    )
    .await;
    assert_eq!(entry.machine_status, MachineStatus::Off);
    assert_eq!(entry.sarees_produced, 0);
    assert_eq!(entry.total_cost, 0.0);
    assert_eq!(entry.cost_per_saree, 10.0);
    assert_eq!(entry.day_of_week, DayOfWeek::Mon);

    let patch = ProductionPatch::from_payload(&payload(json!({
        "machineStatus": "ON", "sareesProduced": 20
    })))
    .unwrap();
    let updated = update_production(&pool, &entry.id, &patch).await.unwrap();
    assert_eq!(updated.sarees_produced, 20);
    assert_eq!(updated.total_cost, 200.0);

    let patch = ProductionPatch::from_payload(&payload(json!({"costPerSaree": 12}))).unwrap();
    let updated = update_production(&pool, &entry.id, &patch).await.unwrap();
    assert_eq!(updated.total_cost, 240.0);

    let patch = ProductionPatch::from_payload(&payload(json!({"machineStatus": "OFF"}))).unwrap();
    let updated = update_production(&pool, &entry.id, &patch).await.unwrap();
    assert_eq!(updated.sarees_produced, 0);
    assert_eq!(updated.total_cost, 0.0);
}

#[tokio::test]
async fn test_update_unknown_production_is_not_found() {
    let (_dir, pool) = setup_db().await;
    let err = update_production(&pool, "missing", &ProductionPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_production_filters() {
    let (_dir, pool) = setup_db().await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-06", "sareesProduced": 5})).await;
    add_production(&pool, json!({"machineId": "LM-02", "date": "2024-05-06", "sareesProduced": 6})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-08", "sareesProduced": 7})).await;

    let query = ProductionQuery {
        machine_id: Some("LM-01".to_string()),
        sort: SortOrder::Asc,
        ..Default::default()
    };
    let rows = list_production(&pool, &query).await.unwrap();
    assert_eq!(rows.iter().map(|p| p.sarees_produced).collect::<Vec<_>>(), vec![5, 7]);

    let query = ProductionQuery {
        dates: DateFilter::from_params(None, None, Some("2024-05-06")).unwrap(),
        ..Default::default()
    };
    assert_eq!(list_production(&pool, &query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_machine_totals_for_one_day() {
    let (_dir, pool) = setup_db().await;
    add_production(&pool, json!({"machineId": "LM-02", "date": "2024-05-06", "sareesProduced": 4, "costPerSaree": 10})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-06T08:00", "sareesProduced": 3, "costPerSaree": 5})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-06T20:00", "sareesProduced": 2, "costPerSaree": 5})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-07", "sareesProduced": 9, "costPerSaree": 5})).await;

    let totals = machine_totals(&pool, day("2024-05-06")).await.unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].machine_id, "LM-01");
    assert_eq!(totals[0].sarees_produced, 5);
    assert_eq!(totals[0].total_cost, 25.0);
    assert_eq!(totals[1].machine_id, "LM-02");
    assert_eq!(totals[1].total_cost, 40.0);
}

#[tokio::test]
async fn test_weekly_totals_window_and_exact_timestamp_grouping() {
    let (_dir, pool) = setup_db().await;
    // Inside the window (2024-05-06 .. 2024-05-27)
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-06", "sareesProduced": 1, "costPerSaree": 10})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-20", "sareesProduced": 2, "costPerSaree": 10})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-20", "sareesProduced": 3, "costPerSaree": 10})).await;
    // Same machine and day, different stored time: not merged
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-20T15:00", "sareesProduced": 4, "costPerSaree": 10})).await;
    add_production(&pool, json!({"machineId": "LM-02", "date": "2024-05-27T23:00", "sareesProduced": 5, "costPerSaree": 10})).await;
    // Outside the window
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-05", "sareesProduced": 100})).await;
    add_production(&pool, json!({"machineId": "LM-01", "date": "2024-05-28", "sareesProduced": 100})).await;

    let totals = weekly_totals(&pool, day("2024-05-27")).await.unwrap();
    let summary: Vec<_> = totals
        .iter()
        .map(|t| (t.machine_id.as_str(), t.date.to_string(), t.sarees_produced))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("LM-02", "2024-05-27 23:00:00".to_string(), 5),
            ("LM-01", "2024-05-20 15:00:00".to_string(), 4),
            ("LM-01", "2024-05-20 00:00:00".to_string(), 5),
            ("LM-01", "2024-05-06 00:00:00".to_string(), 1),
        ]
    );
    assert_eq!(totals[2].total_cost, 50.0);
}

#[tokio::test]
async fn test_aggregates_survive_oversized_counts() {
    let (_dir, pool) = setup_db().await;

    let oversized = |machine: &str| ProductionDraft {
        machine_id: machine.to_string(),
        date: parse_date_input("2024-05-06").unwrap(),
        day_of_week: None,
        sarees_produced: 1e19,
        warping_capacity: None,
        cost_per_saree: 1.0,
        machine_status: MachineStatus::On,
    };
    let first = create_production(&pool, oversized("LM-01")).await.unwrap();
    create_production(&pool, oversized("LM-01")).await.unwrap();
    assert_eq!(first.sarees_produced, MAX_SAREES_PER_ENTRY);

    // Rows written before counts were bounded
    for id in ["legacy-1", "legacy-2"] {
        sqlx::query(
            r#"
            INSERT INTO production (id, machine_id, date, day_of_week, sarees_produced,
                                    cost_per_saree, total_cost, machine_status, created_at)
            VALUES (?, 'LM-09', '2024-05-06T00:00:00.000', 'Mon', ?, 1, 0, 'ON',
                    '2024-05-06T00:00:00.000')
            "#,
        )
        .bind(id)
        .bind(i64::MAX)
        .execute(&pool)
        .await
        .unwrap();
    }

    let totals = machine_totals(&pool, day("2024-05-06")).await.unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].machine_id, "LM-01");
    assert_eq!(totals[0].sarees_produced, 2 * MAX_SAREES_PER_ENTRY);
    assert_eq!(totals[1].machine_id, "LM-09");
    assert_eq!(totals[1].sarees_produced, i64::MAX);

    let weekly = weekly_totals(&pool, day("2024-05-10")).await.unwrap();
    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly[0].sarees_produced, 2 * MAX_SAREES_PER_ENTRY);
    assert_eq!(weekly[1].sarees_produced, i64::MAX);
}
