//! Persisted entities as returned to callers

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::derivation::{
    AttendanceStatus, DayOfWeek, MachineStatus, ProductionDraft, WorkerRecordDraft,
};

/// Worker master record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: String,
    pub name: String,
    #[serde(with = "crate::time::optional_day")]
    pub dob: Option<NaiveDate>,
    pub daily_salary: f64,
    #[serde(with = "crate::time::stamp")]
    pub created_at: NaiveDateTime,
}

/// Owning worker as embedded in a record response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub id: String,
    pub name: String,
    pub daily_salary: f64,
}

/// One day's attendance/payroll entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    pub id: String,
    pub worker_id: String,
    /// Current worker master data; `None` if the worker no longer exists
    pub worker: Option<WorkerSummary>,
    /// Name captured when the record was written
    pub worker_name: String,
    #[serde(with = "crate::time::stamp")]
    pub date: NaiveDateTime,
    pub day_of_week: DayOfWeek,
    pub status: AttendanceStatus,
    pub advance: f64,
    pub salary_before: f64,
    pub salary_after: f64,
    pub net_salary: f64,
    #[serde(with = "crate::time::stamp")]
    pub created_at: NaiveDateTime,
}

impl WorkerRecord {
    /// Stored inputs as a draft, for partial updates
    pub fn to_draft(&self) -> WorkerRecordDraft {
        WorkerRecordDraft {
            worker_id: self.worker_id.clone(),
            worker_name: self.worker_name.clone(),
            date: self.date,
            day_of_week: Some(self.day_of_week),
            status: self.status,
            advance: self.advance,
            salary_before: self.salary_before,
        }
    }
}

/// One day's output entry for a machine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    pub id: String,
    pub machine_id: String,
    #[serde(with = "crate::time::stamp")]
    pub date: NaiveDateTime,
    pub day_of_week: DayOfWeek,
    pub sarees_produced: i64,
    pub warping_capacity: Option<f64>,
    pub cost_per_saree: f64,
    pub total_cost: f64,
    pub machine_status: MachineStatus,
    #[serde(with = "crate::time::stamp")]
    pub created_at: NaiveDateTime,
}

impl Production {
    /// Stored inputs as a draft, for partial updates
    pub fn to_draft(&self) -> ProductionDraft {
        ProductionDraft {
            machine_id: self.machine_id.clone(),
            date: self.date,
            day_of_week: Some(self.day_of_week),
            sarees_produced: self.sarees_produced as f64,
            warping_capacity: self.warping_capacity,
            cost_per_saree: self.cost_per_saree,
            machine_status: self.machine_status,
        }
    }
}

/// Per-machine totals for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineTotal {
    pub machine_id: String,
    pub sarees_produced: i64,
    pub total_cost: f64,
}

/// Totals for one (machine, stored date) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotal {
    pub machine_id: String,
    #[serde(with = "crate::time::stamp")]
    pub date: NaiveDateTime,
    pub sarees_produced: i64,
    pub total_cost: f64,
}
