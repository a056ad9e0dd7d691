//! Attendance/payroll records

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::models::{WorkerRecord, WorkerSummary};
use crate::db::query::{DateFilter, SortOrder};
use crate::db::workers::{get_worker, resolve_worker};
use crate::derivation::{normalize_worker_record, NormalizedWorkerRecord, WorkerRecordDraft};
use crate::input::{NewWorkerRecord, WorkerRecordPatch};
use crate::time::{self, format_stamp, parse_stamp};
use crate::{Error, Result};

/// Filters for listing records
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Case-insensitive substring of the worker's current name or the record's snapshot name
    pub name: Option<String>,
    pub dates: DateFilter,
    pub sort: SortOrder,
}

const RECORD_SELECT: &str = r#"
    SELECT r.id, r.worker_id, r.worker_name, r.date, r.day_of_week, r.status,
           r.advance, r.salary_before, r.salary_after, r.net_salary, r.created_at,
           w.id AS w_id, w.name AS w_name, w.daily_salary AS w_daily_salary
    FROM worker_records r
    LEFT JOIN workers w ON w.id = r.worker_id
"#;

fn record_from_row(row: &SqliteRow) -> Result<WorkerRecord> {
    let date: String = row.get("date");
    let created_at: String = row.get("created_at");
    let day_of_week: String = row.get("day_of_week");
    let status: String = row.get("status");

    let worker = match row.get::<Option<String>, _>("w_id") {
        Some(id) => Some(WorkerSummary {
            id,
            name: row.get("w_name"),
            daily_salary: row.get("w_daily_salary"),
        }),
        None => None,
    };

    Ok(WorkerRecord {
        id: row.get("id"),
        worker_id: row.get("worker_id"),
        worker,
        worker_name: row.get("worker_name"),
        date: parse_stamp(&date)?,
        day_of_week: day_of_week
            .parse()
            .map_err(|_| Error::Internal(format!("Corrupt stored day: {}", day_of_week)))?,
        status: status
            .parse()
            .map_err(|_| Error::Internal(format!("Corrupt stored status: {}", status)))?,
        advance: row.get("advance"),
        salary_before: row.get("salary_before"),
        salary_after: row.get("salary_after"),
        net_salary: row.get("net_salary"),
        created_at: parse_stamp(&created_at)?,
    })
}

pub async fn find_record(pool: &SqlitePool, id: &str) -> Result<Option<WorkerRecord>> {
    let row = sqlx::query(&format!("{} WHERE r.id = ?", RECORD_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(record_from_row).transpose()
}

pub async fn get_record(pool: &SqlitePool, id: &str) -> Result<WorkerRecord> {
    find_record(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Record not found: {}", id)))
}

/// List records matching `query`, ordered by date
pub async fn list_records(pool: &SqlitePool, query: &RecordQuery) -> Result<Vec<WorkerRecord>> {
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let (start, end) = query.dates.bind_values();

    let sql = format!(
        r#"{}
        WHERE (? IS NULL
               OR instr(lower(w.name), lower(?)) > 0
               OR instr(lower(r.worker_name), lower(?)) > 0)
          AND (? IS NULL OR r.date >= ?)
          AND (? IS NULL OR r.date <= ?)
        ORDER BY r.date {}, r.created_at {}
        "#,
        RECORD_SELECT,
        query.sort.as_sql(),
        query.sort.as_sql()
    );

    let rows = sqlx::query(&sql)
        .bind(name)
        .bind(name)
        .bind(name)
        .bind(start.as_deref())
        .bind(start.as_deref())
        .bind(end.as_deref())
        .bind(end.as_deref())
        .fetch_all(pool)
        .await?;

    rows.iter().map(record_from_row).collect()
}

async fn insert_record(pool: &SqlitePool, record: &NormalizedWorkerRecord) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO worker_records (
            id, worker_id, worker_name, date, day_of_week, status,
            advance, salary_before, salary_after, net_salary, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&record.worker_id)
    .bind(&record.worker_name)
    .bind(format_stamp(&record.date))
    .bind(record.day_of_week.as_str())
    .bind(record.status.as_str())
    .bind(record.advance)
    .bind(record.salary_before)
    .bind(record.salary_after)
    .bind(record.net_salary)
    .bind(format_stamp(&time::now()))
    .execute(pool)
    .await?;

    Ok(id)
}

/// Create a record, resolving (and possibly creating) its worker first
pub async fn create_record(pool: &SqlitePool, new: &NewWorkerRecord) -> Result<WorkerRecord> {
    let resolved = resolve_worker(pool, &new.worker, new.salary).await?;
    if resolved.created {
        info!("Created worker '{}' from record entry", resolved.name);
    }

    let normalized = normalize_worker_record(WorkerRecordDraft {
        worker_id: resolved.id,
        worker_name: resolved.name,
        date: new.date,
        day_of_week: new.day_of_week,
        status: new.status,
        advance: new.advance,
        salary_before: resolved.salary_before,
    });

    let id = insert_record(pool, &normalized).await?;
    get_record(pool, &id).await
}

/// Apply a partial update and recompute the derived salary fields.
///
/// A `workerId` in the patch moves the record to that worker, refreshing the
/// name snapshot; without an explicit salary the new worker's daily salary
/// becomes the basis.
pub async fn update_record(
    pool: &SqlitePool,
    id: &str,
    patch: &WorkerRecordPatch,
) -> Result<WorkerRecord> {
    let existing = get_record(pool, id).await?;
    let mut draft = existing.to_draft();

    if let Some(worker_id) = &patch.worker_id {
        let worker = get_worker(pool, worker_id).await?;
        draft.worker_id = worker.id;
        draft.worker_name = worker.name;
        if patch.salary_before.is_none() {
            draft.salary_before = worker.daily_salary;
        }
    }

    let normalized = normalize_worker_record(patch.apply_to(draft));

    sqlx::query(
        r#"
        UPDATE worker_records
        SET worker_id = ?, worker_name = ?, date = ?, day_of_week = ?, status = ?,
            advance = ?, salary_before = ?, salary_after = ?, net_salary = ?
        WHERE id = ?
        "#,
    )
    .bind(&normalized.worker_id)
    .bind(&normalized.worker_name)
    .bind(format_stamp(&normalized.date))
    .bind(normalized.day_of_week.as_str())
    .bind(normalized.status.as_str())
    .bind(normalized.advance)
    .bind(normalized.salary_before)
    .bind(normalized.salary_after)
    .bind(normalized.net_salary)
    .bind(id)
    .execute(pool)
    .await?;

    get_record(pool, id).await
}

pub async fn delete_record(pool: &SqlitePool, id: &str) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM worker_records WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(Error::NotFound(format!("Record not found: {}", id)));
    }
    Ok(())
}
