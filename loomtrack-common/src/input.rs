//! Typed write requests parsed from lenient request payloads
//!
//! Field aliases accepted by the HTTP surface are resolved here:
//! - `workerName` / `name`
//! - `advance` / `advanceTaken` / `advanceAmount`
//! - `salaryBefore` / `salary` / `dailySalary`
//! - `dob` / `dateOfBirth`

use chrono::{NaiveDate, NaiveDateTime};

use crate::derivation::{
    AttendanceStatus, DayOfWeek, MachineStatus, ProductionDraft, WorkerRecordDraft,
    MAX_SAREES_PER_ENTRY,
};
use crate::lenient::{self, Payload};
use crate::time::{parse_date_input, parse_day};
use crate::{Error, Result};

const WORKER_NAME_KEYS: &[&str] = &["workerName", "name"];
const ADVANCE_KEYS: &[&str] = &["advance", "advanceTaken", "advanceAmount"];
const CREATE_SALARY_KEYS: &[&str] = &["salaryBefore", "salary", "dailySalary"];
const UPDATE_SALARY_KEYS: &[&str] = &["salaryBefore", "salary"];
const DOB_KEYS: &[&str] = &["dob", "dateOfBirth"];

fn parse_optional<T: std::str::FromStr<Err = Error>>(p: &Payload, key: &str) -> Result<Option<T>> {
    p.text(key).map(|s| s.parse()).transpose()
}

fn parse_optional_date(p: &Payload, key: &str) -> Result<Option<NaiveDateTime>> {
    p.text(key).map(|s| parse_date_input(&s)).transpose()
}

/// `Some(None)` when a dob key is present but blank or null (clear it)
fn parse_dob_patch(p: &Payload) -> Result<Option<Option<NaiveDate>>> {
    if let Some(s) = p.text_any(DOB_KEYS) {
        return parse_day(&s).map(|d| Some(Some(d)));
    }
    if DOB_KEYS.iter().any(|k| p.contains(k)) {
        return Ok(Some(None));
    }
    Ok(None)
}

// ============================================================================
// Workers
// ============================================================================

/// POST /workers body
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorker {
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub daily_salary: f64,
}

impl NewWorker {
    pub fn from_payload(p: &Payload) -> Result<Self> {
        let name = p
            .text("name")
            .ok_or_else(|| Error::InvalidInput("Name is required".to_string()))?;
        let dob = parse_dob_patch(p)?.flatten();

        Ok(Self {
            name,
            dob,
            daily_salary: lenient::number(p.get("dailySalary")),
        })
    }
}

/// PUT /workers/:id body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerPatch {
    pub name: Option<String>,
    pub dob: Option<Option<NaiveDate>>,
    pub daily_salary: Option<f64>,
}

impl WorkerPatch {
    pub fn from_payload(p: &Payload) -> Result<Self> {
        let name = match p.text("name") {
            Some(n) => Some(n),
            None if p.contains("name") => {
                return Err(Error::InvalidInput("Name cannot be empty".to_string()))
            }
            None => None,
        };

        Ok(Self {
            name,
            dob: parse_dob_patch(p)?,
            daily_salary: p.get("dailySalary").map(|v| lenient::number(Some(v))),
        })
    }
}

// ============================================================================
// Worker records
// ============================================================================

/// How a new record names its worker
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRef {
    /// Explicit identifier; must exist
    Id(String),
    /// Free-text name; resolved case-insensitively or created
    Name(String),
}

/// POST /workers/records body
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkerRecord {
    pub worker: WorkerRef,
    pub date: NaiveDateTime,
    pub day_of_week: Option<DayOfWeek>,
    pub status: AttendanceStatus,
    pub advance: f64,
    /// Salary figure as supplied; `None` when no alias was sent
    pub salary: Option<f64>,
}

impl NewWorkerRecord {
    pub fn from_payload(p: &Payload) -> Result<Self> {
        let date = p
            .text("date")
            .ok_or_else(|| Error::InvalidInput("Date is required".to_string()))?;
        let date = parse_date_input(&date)?;

        let worker = match (p.text("workerId"), p.text_any(WORKER_NAME_KEYS)) {
            (Some(id), _) => WorkerRef::Id(id),
            (None, Some(name)) => WorkerRef::Name(name),
            (None, None) => {
                return Err(Error::InvalidInput(
                    "workerId or workerName required".to_string(),
                ))
            }
        };

        Ok(Self {
            worker,
            date,
            day_of_week: parse_optional(p, "dayOfWeek")?,
            status: parse_optional(p, "status")?.unwrap_or_default(),
            advance: lenient::number(p.get_any(ADVANCE_KEYS)),
            salary: p.number_any(CREATE_SALARY_KEYS),
        })
    }
}

/// PUT /workers/records/:id body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerRecordPatch {
    pub worker_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub day_of_week: Option<DayOfWeek>,
    pub status: Option<AttendanceStatus>,
    pub advance: Option<f64>,
    pub salary_before: Option<f64>,
}

impl WorkerRecordPatch {
    pub fn from_payload(p: &Payload) -> Result<Self> {
        Ok(Self {
            worker_id: p.text("workerId"),
            date: parse_optional_date(p, "date")?,
            day_of_week: parse_optional(p, "dayOfWeek")?,
            status: parse_optional(p, "status")?,
            advance: p.number_any(ADVANCE_KEYS),
            salary_before: p.number_any(UPDATE_SALARY_KEYS),
        })
    }

    /// Overlay the supplied fields on a draft built from the stored record.
    ///
    /// A new date without an explicit day re-derives the day of week.
    pub fn apply_to(&self, mut draft: WorkerRecordDraft) -> WorkerRecordDraft {
        if let Some(date) = self.date {
            draft.date = date;
            draft.day_of_week = self.day_of_week;
        } else if self.day_of_week.is_some() {
            draft.day_of_week = self.day_of_week;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(advance) = self.advance {
            draft.advance = advance;
        }
        if let Some(salary) = self.salary_before {
            draft.salary_before = salary;
        }
        draft
    }
}

// ============================================================================
// Production
// ============================================================================

fn checked_sarees(sarees: f64) -> Result<f64> {
    if sarees > MAX_SAREES_PER_ENTRY as f64 {
        return Err(Error::InvalidInput(format!(
            "sareesProduced must not exceed {}",
            MAX_SAREES_PER_ENTRY
        )));
    }
    Ok(sarees)
}

/// POST /production body
pub fn production_from_payload(p: &Payload) -> Result<ProductionDraft> {
    let (machine_id, date) = match (p.text("machineId"), p.text("date")) {
        (Some(m), Some(d)) => (m, d),
        _ => {
            return Err(Error::InvalidInput(
                "machineId and date are required".to_string(),
            ))
        }
    };

    Ok(ProductionDraft {
        machine_id,
        date: parse_date_input(&date)?,
        day_of_week: parse_optional(p, "dayOfWeek")?,
        sarees_produced: checked_sarees(lenient::number(p.get("sareesProduced")))?,
        warping_capacity: lenient::optional_number(p.get("warpingCapacity")),
        cost_per_saree: lenient::number(p.get("costPerSaree")),
        machine_status: parse_optional(p, "machineStatus")?.unwrap_or_default(),
    })
}

/// PUT /production/:id body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionPatch {
    pub machine_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub day_of_week: Option<DayOfWeek>,
    pub sarees_produced: Option<f64>,
    pub warping_capacity: Option<Option<f64>>,
    pub cost_per_saree: Option<f64>,
    pub machine_status: Option<MachineStatus>,
}

impl ProductionPatch {
    pub fn from_payload(p: &Payload) -> Result<Self> {
        let machine_id = match p.text("machineId") {
            Some(m) => Some(m),
            None if p.contains("machineId") => {
                return Err(Error::InvalidInput("machineId cannot be empty".to_string()))
            }
            None => None,
        };
        let warping_capacity = if p.contains("warpingCapacity") {
            Some(lenient::optional_number(p.get("warpingCapacity")))
        } else {
            None
        };

        Ok(Self {
            machine_id,
            date: parse_optional_date(p, "date")?,
            day_of_week: parse_optional(p, "dayOfWeek")?,
            sarees_produced: p
                .get("sareesProduced")
                .map(|v| checked_sarees(lenient::number(Some(v))))
                .transpose()?,
            warping_capacity,
            cost_per_saree: p.get("costPerSaree").map(|v| lenient::number(Some(v))),
            machine_status: parse_optional(p, "machineStatus")?,
        })
    }

    /// Overlay the supplied fields on a draft built from the stored entry.
    ///
    /// Omitted fields keep their persisted values, so `totalCost` is always
    /// recomputed from the effective pair of factors.
    pub fn apply_to(&self, mut draft: ProductionDraft) -> ProductionDraft {
        if let Some(machine_id) = &self.machine_id {
            draft.machine_id = machine_id.clone();
        }
        if let Some(date) = self.date {
            draft.date = date;
            draft.day_of_week = self.day_of_week;
        } else if self.day_of_week.is_some() {
            draft.day_of_week = self.day_of_week;
        }
        if let Some(sarees) = self.sarees_produced {
            draft.sarees_produced = sarees;
        }
        if let Some(capacity) = self.warping_capacity {
            draft.warping_capacity = capacity;
        }
        if let Some(cost) = self.cost_per_saree {
            draft.cost_per_saree = cost;
        }
        if let Some(status) = self.machine_status {
            draft.machine_status = status;
        }
        draft
    }
}
