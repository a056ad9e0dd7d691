//! Derivation engine
//!
//! Pure functions computing the derived fields of production and attendance
//! entries. Every write path (create and update) builds a draft, runs it
//! through the matching `normalize_*` function and persists the result, so
//! stored `dayOfWeek`, `totalCost`, `salaryAfter` and `netSalary` always agree
//! with their inputs.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Day of week, zero-indexed from Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayOfWeek {
    const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sun,
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
    ];

    /// Gregorian weekday of a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_sunday() as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Sun => "Sun",
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid dayOfWeek: {}", s)))
    }
}

/// Explicit day wins; otherwise derive from the date
pub fn derive_day_of_week(date: &NaiveDateTime, explicit: Option<DayOfWeek>) -> DayOfWeek {
    explicit.unwrap_or_else(|| DayOfWeek::from_date(date.date()))
}

/// Loom power state for a production entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MachineStatus {
    #[default]
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl MachineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MachineStatus::On => "ON",
            MachineStatus::Off => "OFF",
        }
    }
}

impl FromStr for MachineStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(MachineStatus::On),
            "OFF" => Ok(MachineStatus::Off),
            other => Err(Error::InvalidInput(format!("Invalid machineStatus: {}", other))),
        }
    }
}

/// Attendance for one worker-day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Leave => "Leave",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Leave" => Ok(AttendanceStatus::Leave),
            other => Err(Error::InvalidInput(format!("Invalid status: {}", other))),
        }
    }
}

// ============================================================================
// Production
// ============================================================================

/// Production entry before derivation. `sarees_produced` is the raw coerced input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionDraft {
    pub machine_id: String,
    pub date: NaiveDateTime,
    pub day_of_week: Option<DayOfWeek>,
    pub sarees_produced: f64,
    pub warping_capacity: Option<f64>,
    pub cost_per_saree: f64,
    pub machine_status: MachineStatus,
}

/// Production entry with every derived field filled in
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProduction {
    pub machine_id: String,
    pub date: NaiveDateTime,
    pub day_of_week: DayOfWeek,
    pub sarees_produced: i64,
    pub warping_capacity: Option<f64>,
    pub cost_per_saree: f64,
    pub total_cost: f64,
    pub machine_status: MachineStatus,
}

/// Upper bound on the sarees a single entry may record
pub const MAX_SAREES_PER_ENTRY: i64 = 1_000_000;

/// Sarees counted for a machine state: always 0 when OFF, otherwise a whole
/// count clamped to `0..=MAX_SAREES_PER_ENTRY`
pub fn effective_sarees(status: MachineStatus, sarees_produced: f64) -> i64 {
    match status {
        MachineStatus::Off => 0,
        MachineStatus::On if sarees_produced.is_finite() && sarees_produced > 0.0 => {
            sarees_produced.trunc().min(MAX_SAREES_PER_ENTRY as f64) as i64
        }
        MachineStatus::On => 0,
    }
}

/// `sareesProduced * costPerSaree`
pub fn total_cost(sarees_produced: i64, cost_per_saree: f64) -> f64 {
    let cost = if cost_per_saree.is_finite() {
        cost_per_saree
    } else {
        0.0
    };
    sarees_produced as f64 * cost
}

pub fn normalize_production(draft: ProductionDraft) -> NormalizedProduction {
    let day_of_week = derive_day_of_week(&draft.date, draft.day_of_week);
    let sarees_produced = effective_sarees(draft.machine_status, draft.sarees_produced);
    let cost_per_saree = if draft.cost_per_saree.is_finite() {
        draft.cost_per_saree
    } else {
        0.0
    };

    NormalizedProduction {
        machine_id: draft.machine_id,
        date: draft.date,
        day_of_week,
        sarees_produced,
        warping_capacity: draft.warping_capacity,
        cost_per_saree,
        total_cost: total_cost(sarees_produced, cost_per_saree),
        machine_status: draft.machine_status,
    }
}

// ============================================================================
// Worker records
// ============================================================================

/// Salary figures derived for one worker-day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payroll {
    pub salary_after: f64,
    pub net_salary: f64,
}

/// Leave: nothing earned and any advance is owed (negative net).
/// Present: `salaryBefore - advance`, which may be negative.
pub fn compute_payroll(status: AttendanceStatus, salary_before: f64, advance: f64) -> Payroll {
    match status {
        AttendanceStatus::Leave => Payroll {
            salary_after: 0.0,
            net_salary: 0.0 - advance,
        },
        AttendanceStatus::Present => {
            let salary_after = salary_before - advance;
            Payroll {
                salary_after,
                net_salary: salary_after,
            }
        }
    }
}

/// Attendance entry before derivation
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRecordDraft {
    pub worker_id: String,
    pub worker_name: String,
    pub date: NaiveDateTime,
    pub day_of_week: Option<DayOfWeek>,
    pub status: AttendanceStatus,
    pub advance: f64,
    pub salary_before: f64,
}

/// Attendance entry with every derived field filled in
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWorkerRecord {
    pub worker_id: String,
    pub worker_name: String,
    pub date: NaiveDateTime,
    pub day_of_week: DayOfWeek,
    pub status: AttendanceStatus,
    pub advance: f64,
    pub salary_before: f64,
    pub salary_after: f64,
    pub net_salary: f64,
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

pub fn normalize_worker_record(draft: WorkerRecordDraft) -> NormalizedWorkerRecord {
    let day_of_week = derive_day_of_week(&draft.date, draft.day_of_week);
    let advance = finite_or_zero(draft.advance);
    let salary_before = finite_or_zero(draft.salary_before);
    let payroll = compute_payroll(draft.status, salary_before, advance);

    NormalizedWorkerRecord {
        worker_id: draft.worker_id,
        worker_name: draft.worker_name,
        date: draft.date,
        day_of_week,
        status: draft.status,
        advance,
        salary_before,
        salary_after: payroll.salary_after,
        net_salary: payroll.net_salary,
    }
}
