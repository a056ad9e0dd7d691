//! Worker master records and worker resolution

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::models::Worker;
use crate::input::{NewWorker, WorkerPatch, WorkerRef};
use crate::time::{self, format_stamp, parse_stamp, parse_stored_day, DATE_FORMAT};
use crate::{Error, Result};

const WORKER_COLUMNS: &str = "id, name, dob, daily_salary, created_at";

fn worker_from_row(row: &SqliteRow) -> Result<Worker> {
    let dob: Option<String> = row.get("dob");
    let created_at: String = row.get("created_at");

    Ok(Worker {
        id: row.get("id"),
        name: row.get("name"),
        dob: dob.as_deref().map(parse_stored_day).transpose()?,
        daily_salary: row.get("daily_salary"),
        created_at: parse_stamp(&created_at)?,
    })
}

/// All workers, name ascending
pub async fn list_workers(pool: &SqlitePool) -> Result<Vec<Worker>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM workers ORDER BY name ASC, created_at ASC",
        WORKER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(worker_from_row).collect()
}

pub async fn find_worker(pool: &SqlitePool, id: &str) -> Result<Option<Worker>> {
    let row = sqlx::query(&format!("SELECT {} FROM workers WHERE id = ?", WORKER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(worker_from_row).transpose()
}

/// Like [`find_worker`] but an unknown id is [`Error::NotFound`]
pub async fn get_worker(pool: &SqlitePool, id: &str) -> Result<Worker> {
    find_worker(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Worker not found: {}", id)))
}

/// Oldest worker whose name equals `name` ignoring case
pub async fn find_worker_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Worker>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM workers WHERE name = ? COLLATE NOCASE ORDER BY created_at ASC LIMIT 1",
        WORKER_COLUMNS
    ))
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(worker_from_row).transpose()
}

pub async fn create_worker(pool: &SqlitePool, new: &NewWorker) -> Result<Worker> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Name is required".to_string()));
    }

    let worker = Worker {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        dob: new.dob,
        daily_salary: new.daily_salary,
        created_at: time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO workers (id, name, dob, daily_salary, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&worker.id)
    .bind(&worker.name)
    .bind(worker.dob.map(|d| d.format(DATE_FORMAT).to_string()))
    .bind(worker.daily_salary)
    .bind(format_stamp(&worker.created_at))
    .execute(pool)
    .await?;

    info!("Created worker {} ({})", worker.name, worker.id);
    Ok(worker)
}

/// Apply a partial update. Existing record name snapshots are left untouched.
pub async fn update_worker(pool: &SqlitePool, id: &str, patch: &WorkerPatch) -> Result<Worker> {
    let mut worker = get_worker(pool, id).await?;

    if let Some(name) = &patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Name cannot be empty".to_string()));
        }
        worker.name = name.to_string();
    }
    if let Some(dob) = patch.dob {
        worker.dob = dob;
    }
    if let Some(salary) = patch.daily_salary {
        worker.daily_salary = salary;
    }

    sqlx::query("UPDATE workers SET name = ?, dob = ?, daily_salary = ? WHERE id = ?")
        .bind(&worker.name)
        .bind(worker.dob.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(worker.daily_salary)
        .bind(&worker.id)
        .execute(pool)
        .await?;

    Ok(worker)
}

/// Delete a worker and every record referencing it in one transaction.
///
/// Returns the number of records removed.
pub async fn delete_worker(pool: &SqlitePool, id: &str) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let records = sqlx::query("DELETE FROM worker_records WHERE worker_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let workers = sqlx::query("DELETE FROM workers WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if workers == 0 {
        tx.rollback().await?;
        return Err(Error::NotFound(format!("Worker not found: {}", id)));
    }

    tx.commit().await?;
    info!("Deleted worker {} and {} record(s)", id, records);
    Ok(records)
}

/// Outcome of resolving the worker named by a new record
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWorker {
    pub id: String,
    /// Canonical stored name (may differ in case from the input)
    pub name: String,
    /// Salary basis for the record
    pub salary_before: f64,
    /// True when resolution created the worker
    pub created: bool,
}

/// Resolve a worker reference for a new record.
///
/// - `Id`: must exist, otherwise [`Error::NotFound`]; never creates.
/// - `Name`: exact case-insensitive match, else a new worker whose daily salary
///   is the supplied figure (0 if none).
///
/// The effective salary is the supplied figure when non-zero, else the worker's
/// daily salary. Two concurrent first-time resolutions of the same name can both
/// create a worker; no lock is taken.
pub async fn resolve_worker(
    pool: &SqlitePool,
    reference: &WorkerRef,
    supplied_salary: Option<f64>,
) -> Result<ResolvedWorker> {
    let (worker, created) = match reference {
        WorkerRef::Id(id) => {
            let worker = find_worker(pool, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Worker not found with provided ID: {}", id)))?;
            (worker, false)
        }
        WorkerRef::Name(name) => match find_worker_by_name(pool, name).await? {
            Some(worker) => (worker, false),
            None => {
                let new = NewWorker {
                    name: name.trim().to_string(),
                    dob: None,
                    daily_salary: supplied_salary.unwrap_or(0.0),
                };
                (create_worker(pool, &new).await?, true)
            }
        },
    };

    let salary_before = match supplied_salary {
        Some(s) if s != 0.0 => s,
        _ => worker.daily_salary,
    };

    Ok(ResolvedWorker {
        id: worker.id,
        name: worker.name,
        salary_before,
        created,
    })
}
