//! Shared list filters: day-granular date ranges and sort direction

use chrono::NaiveDateTime;

use crate::time::{end_of_day, format_stamp, parse_day, start_of_day};
use crate::Result;

/// Sort direction on `date`; newest first unless the caller asks for `asc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Inclusive date range with day-boundary expansion. Both ends optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateFilter {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

impl DateFilter {
    /// Build from `date` / `startDate` / `endDate` query parameters.
    ///
    /// `date` selects a single calendar day and takes precedence over the range.
    /// Blank parameters are ignored; malformed ones are rejected.
    pub fn from_params(
        date: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self> {
        if let Some(d) = non_blank(date) {
            let day = parse_day(d)?;
            return Ok(Self {
                start: Some(start_of_day(day)),
                end: Some(end_of_day(day)),
            });
        }

        let start = non_blank(start_date)
            .map(parse_day)
            .transpose()?
            .map(start_of_day);
        let end = non_blank(end_date)
            .map(parse_day)
            .transpose()?
            .map(end_of_day);

        Ok(Self { start, end })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Bounds rendered for SQL binding (`NULL` disables that side)
    pub fn bind_values(&self) -> (Option<String>, Option<String>) {
        (
            self.start.as_ref().map(format_stamp),
            self.end.as_ref().map(format_stamp),
        )
    }
}
