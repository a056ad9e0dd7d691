//! Machine production entries and aggregates

use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::models::{MachineTotal, Production, WeeklyTotal};
use crate::db::query::{DateFilter, SortOrder};
use crate::derivation::{normalize_production, total_cost, NormalizedProduction, ProductionDraft};
use crate::input::ProductionPatch;
use crate::time::{self, end_of_day, format_stamp, parse_stamp, start_of_day, window_ending};
use crate::{Error, Result};

/// Length of the rolling window used by [`weekly_totals`], in days
pub const WEEKLY_WINDOW_DAYS: i64 = 21;

/// Filters for listing production entries
#[derive(Debug, Clone, Default)]
pub struct ProductionQuery {
    /// Exact machine identifier
    pub machine_id: Option<String>,
    pub dates: DateFilter,
    pub sort: SortOrder,
}

const PRODUCTION_COLUMNS: &str = "id, machine_id, date, day_of_week, sarees_produced, \
     warping_capacity, cost_per_saree, total_cost, machine_status, created_at";

fn production_from_row(row: &SqliteRow) -> Result<Production> {
    let date: String = row.get("date");
    let created_at: String = row.get("created_at");
    let day_of_week: String = row.get("day_of_week");
    let machine_status: String = row.get("machine_status");
    let sarees_produced: i64 = row.get("sarees_produced");
    let cost_per_saree: f64 = row.get("cost_per_saree");

    Ok(Production {
        id: row.get("id"),
        machine_id: row.get("machine_id"),
        date: parse_stamp(&date)?,
        day_of_week: day_of_week
            .parse()
            .map_err(|_| Error::Internal(format!("Corrupt stored day: {}", day_of_week)))?,
        sarees_produced,
        warping_capacity: row.get("warping_capacity"),
        cost_per_saree,
        // Effective value, independent of what an older write stored
        total_cost: total_cost(sarees_produced, cost_per_saree),
        machine_status: machine_status.parse().map_err(|_| {
            Error::Internal(format!("Corrupt stored machine status: {}", machine_status))
        })?,
        created_at: parse_stamp(&created_at)?,
    })
}

pub async fn find_production(pool: &SqlitePool, id: &str) -> Result<Option<Production>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM production WHERE id = ?",
        PRODUCTION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(production_from_row).transpose()
}

pub async fn get_production(pool: &SqlitePool, id: &str) -> Result<Production> {
    find_production(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Production entry not found: {}", id)))
}

/// List entries matching `query`, ordered by date
pub async fn list_production(pool: &SqlitePool, query: &ProductionQuery) -> Result<Vec<Production>> {
    let machine_id = query
        .machine_id
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    let (start, end) = query.dates.bind_values();

    let sql = format!(
        r#"
        SELECT {} FROM production
        WHERE (? IS NULL OR machine_id = ?)
          AND (? IS NULL OR date >= ?)
          AND (? IS NULL OR date <= ?)
        ORDER BY date {}, created_at {}
        "#,
        PRODUCTION_COLUMNS,
        query.sort.as_sql(),
        query.sort.as_sql()
    );

    let rows = sqlx::query(&sql)
        .bind(machine_id)
        .bind(machine_id)
        .bind(start.as_deref())
        .bind(start.as_deref())
        .bind(end.as_deref())
        .bind(end.as_deref())
        .fetch_all(pool)
        .await?;

    rows.iter().map(production_from_row).collect()
}

pub async fn create_production(pool: &SqlitePool, draft: ProductionDraft) -> Result<Production> {
    let entry = normalize_production(draft);
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO production (
            id, machine_id, date, day_of_week, sarees_produced, warping_capacity,
            cost_per_saree, total_cost, machine_status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&entry.machine_id)
    .bind(format_stamp(&entry.date))
    .bind(entry.day_of_week.as_str())
    .bind(entry.sarees_produced)
    .bind(entry.warping_capacity)
    .bind(entry.cost_per_saree)
    .bind(entry.total_cost)
    .bind(entry.machine_status.as_str())
    .bind(format_stamp(&time::now()))
    .execute(pool)
    .await?;

    info!(
        "Recorded production for {} on {}: {} sarees",
        entry.machine_id,
        entry.date.date(),
        entry.sarees_produced
    );
    get_production(pool, &id).await
}

async fn write_production(pool: &SqlitePool, id: &str, entry: &NormalizedProduction) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE production
        SET machine_id = ?, date = ?, day_of_week = ?, sarees_produced = ?,
            warping_capacity = ?, cost_per_saree = ?, total_cost = ?, machine_status = ?
        WHERE id = ?
        "#,
    )
    .bind(&entry.machine_id)
    .bind(format_stamp(&entry.date))
    .bind(entry.day_of_week.as_str())
    .bind(entry.sarees_produced)
    .bind(entry.warping_capacity)
    .bind(entry.cost_per_saree)
    .bind(entry.total_cost)
    .bind(entry.machine_status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a partial update; omitted fields keep their stored values
pub async fn update_production(
    pool: &SqlitePool,
    id: &str,
    patch: &ProductionPatch,
) -> Result<Production> {
    let existing = get_production(pool, id).await?;
    let entry = normalize_production(patch.apply_to(existing.to_draft()));

    write_production(pool, id, &entry).await?;
    get_production(pool, id).await
}

pub async fn delete_production(pool: &SqlitePool, id: &str) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM production WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(Error::NotFound(format!("Production entry not found: {}", id)));
    }
    Ok(())
}

/// Totals per machine for one calendar day, machine id ascending
///
/// Sums accumulate in floating point, so stored data can never overflow them;
/// an out-of-range saree total saturates at `i64::MAX`.
pub async fn machine_totals(pool: &SqlitePool, day: NaiveDate) -> Result<Vec<MachineTotal>> {
    let rows = sqlx::query(
        r#"
        SELECT machine_id,
               CAST(TOTAL(sarees_produced) AS INTEGER) AS sarees_produced,
               TOTAL(total_cost) AS total_cost
        FROM production
        WHERE date >= ? AND date <= ?
        GROUP BY machine_id
        ORDER BY machine_id ASC
        "#,
    )
    .bind(format_stamp(&start_of_day(day)))
    .bind(format_stamp(&end_of_day(day)))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| MachineTotal {
            machine_id: row.get("machine_id"),
            sarees_produced: row.get("sarees_produced"),
            total_cost: row.get("total_cost"),
        })
        .collect())
}

/// Totals per (machine, stored date) over the three weeks ending at `end_day`.
///
/// Grouping is on the exact stored timestamp, not the calendar day: two
/// entries for the same machine and day with different times stay separate.
pub async fn weekly_totals(pool: &SqlitePool, end_day: NaiveDate) -> Result<Vec<WeeklyTotal>> {
    let (start, end) = window_ending(end_day, WEEKLY_WINDOW_DAYS);

    let rows = sqlx::query(
        r#"
        SELECT machine_id, date,
               CAST(TOTAL(sarees_produced) AS INTEGER) AS sarees_produced,
               TOTAL(total_cost) AS total_cost
        FROM production
        WHERE date >= ? AND date <= ?
        GROUP BY machine_id, date
        ORDER BY date DESC, machine_id ASC
        "#,
    )
    .bind(format_stamp(&start))
    .bind(format_stamp(&end))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let date: String = row.get("date");
            Ok(WeeklyTotal {
                machine_id: row.get("machine_id"),
                date: parse_stamp(&date)?,
                sarees_produced: row.get("sarees_produced"),
                total_cost: row.get("total_cost"),
            })
        })
        .collect()
}
