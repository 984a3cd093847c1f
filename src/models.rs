use std::fmt;
use std::str::FromStr;

use chrono::Month;
use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

/// One row of the sales file.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub year: i32,
    pub month: Month,
    pub automobile_sales: f64,
    pub vehicle_type: String,
    pub total_expenditure: f64,
    pub unemployment_rate: f64,
    pub recession: bool,
}

pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Month for a 1-based calendar number.
pub fn month_from_number(n: u32) -> Option<Month> {
    if (1..=12).contains(&n) {
        Some(MONTHS[(n - 1) as usize])
    } else {
        None
    }
}

/// Three-letter month label ("Jan").
pub fn month_abbrev(month: Month) -> &'static str {
    &month.name()[..3]
}

// ---------------------------------------------------------------------------
// Report selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportType {
    #[serde(rename = "Yearly Statistics")]
    Yearly,
    #[serde(rename = "Recession Period Statistics")]
    RecessionPeriod,
}

pub const REPORT_TYPES: &[ReportType] = &[ReportType::Yearly, ReportType::RecessionPeriod];

impl ReportType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yearly => "Yearly Statistics",
            Self::RecessionPeriod => "Recession Period Statistics",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::RecessionPeriod => "recession",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportType {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        REPORT_TYPES
            .iter()
            .find(|t| {
                t.key().eq_ignore_ascii_case(wanted) || t.label().eq_ignore_ascii_case(wanted)
            })
            .copied()
            .ok_or_else(|| {
                DashError::Validation(format!(
                    "unknown report type '{wanted}' (expected 'yearly' or 'recession')"
                ))
            })
    }
}

/// The two user-controlled inputs. `None` means nothing selected yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRequest {
    pub report_type: Option<ReportType>,
    pub year: Option<i32>,
}

impl ReportRequest {
    pub fn new(report_type: Option<ReportType>, year: Option<i32>) -> Self {
        Self { report_type, year }
    }

    #[allow(dead_code)]
    pub fn yearly(year: i32) -> Self {
        Self::new(Some(ReportType::Yearly), Some(year))
    }

    #[allow(dead_code)]
    pub fn recession() -> Self {
        Self::new(Some(ReportType::RecessionPeriod), None)
    }

    /// Build a request from raw selector values. Blank strings count as "no selection".
    pub fn parse(report_type: Option<&str>, year: Option<&str>) -> Result<Self> {
        let report_type = match report_type.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<ReportType>()?),
        };
        let year = match year.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                DashError::Validation(format!("year must be an integer, got '{raw}'"))
            })?),
        };
        Ok(Self { report_type, year })
    }
}

// ---------------------------------------------------------------------------
// Year domain and trend scope
// ---------------------------------------------------------------------------

/// Inclusive range of selectable years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(DashError::Settings(format!(
                "year range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    #[allow(dead_code)]
    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.start, self.end)
    }

    pub fn years(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: 1980,
            end: 2023,
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Which records feed the yearly trend line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendScope {
    /// Yearly means over the whole data set.
    #[default]
    AllYears,
    /// Only the selected year (a single point).
    SelectedYear,
}
