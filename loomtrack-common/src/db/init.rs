//! Database initialization
//!
//! Opens (creating if needed) the SQLite file and applies the schema.
//! Every statement is idempotent, so this runs on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open the database at `db_path`, creating file, parent directory and tables as needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets list/aggregate reads proceed while a write is in flight
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_workers_table(pool).await?;
    create_worker_records_table(pool).await?;
    create_production_table(pool).await?;
    Ok(())
}

pub async fn create_workers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            dob TEXT,
            daily_salary REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_workers_name ON workers(name COLLATE NOCASE)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_worker_records_table(pool: &SqlitePool) -> Result<()> {
    // No UNIQUE(worker_id, date): several entries per worker-day are allowed
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS worker_records (
            id TEXT PRIMARY KEY,
            worker_id TEXT NOT NULL REFERENCES workers(id),
            worker_name TEXT NOT NULL,
            date TEXT NOT NULL,
            day_of_week TEXT NOT NULL CHECK (day_of_week IN ('Sun','Mon','Tue','Wed','Thu','Fri','Sat')),
            status TEXT NOT NULL DEFAULT 'Present' CHECK (status IN ('Present','Leave')),
            advance REAL NOT NULL DEFAULT 0,
            salary_before REAL NOT NULL,
            salary_after REAL NOT NULL,
            net_salary REAL NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_worker_records_date ON worker_records(date)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_worker_records_worker ON worker_records(worker_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_production_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS production (
            id TEXT PRIMARY KEY,
            machine_id TEXT NOT NULL,
            date TEXT NOT NULL,
            day_of_week TEXT NOT NULL CHECK (day_of_week IN ('Sun','Mon','Tue','Wed','Thu','Fri','Sat')),
            sarees_produced INTEGER NOT NULL DEFAULT 0,
            warping_capacity REAL,
            cost_per_saree REAL NOT NULL DEFAULT 0,
            total_cost REAL NOT NULL DEFAULT 0,
            machine_status TEXT NOT NULL DEFAULT 'ON' CHECK (machine_status IN ('ON','OFF')),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_production_date ON production(date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_production_machine ON production(machine_id)")
        .execute(pool)
        .await?;

    Ok(())
}
