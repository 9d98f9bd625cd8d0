//! Core Data Models
//!
//! This module defines the canonical, client-side shapes every analytics page works with.
//! The backend speaks several dialects of JSON; [`crate::api::wire`] normalises them into
//! these types once, at the boundary, so nothing downstream needs fallback lookups.
//!
//! ## Data Flow
//!
//! 1. **Query**: [`AnalyticsQuery`] - date window plus optional department/doctor filters
//! 2. **Reference data**: [`InitData`] - departments, doctors and the server date
//! 3. **Line items**: [`DetailRow`] inside a [`DetailPage`] - the full result set, no server paging
//! 4. **Aggregates**: [`SummaryViewModel`] - totals and growth rates for the window
//! 5. **Trend**: [`TimeseriesRow`] - one point per date, ascending
//!
//! All of these are transient: a new query replaces them wholesale and rows are never
//! mutated in place.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wire format for dates sent to and received from the backend.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One line item of revenue / workload data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub date: String,
    #[serde(rename = "departmentCode")]
    pub department_code: Option<String>,
    #[serde(rename = "departmentName")]
    pub department_name: Option<String>,
    #[serde(rename = "doctorId")]
    pub doctor_id: Option<String>,
    #[serde(rename = "doctorName")]
    pub doctor_name: Option<String>,
    pub revenue: Option<f64>,
    pub cost: Option<f64>,
    pub quantity: Option<f64>,
    #[serde(rename = "yoyPct")]
    pub yoy_pct: Option<f64>,
    #[serde(rename = "momPct")]
    pub mom_pct: Option<f64>,
}

impl DetailRow {
    /// A row with only its date set.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            department_code: None,
            department_name: None,
            doctor_id: None,
            doctor_name: None,
            revenue: None,
            cost: None,
            quantity: None,
            yoy_pct: None,
            mom_pct: None,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Full detail result set as returned by `{prefix}/details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailPage {
    pub rows: Vec<DetailRow>,
    pub total: usize,
}

/// One point of a trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRow {
    pub date: String,
    pub revenue: Option<f64>,
    #[serde(rename = "lastYear")]
    pub last_year: Option<f64>,
    #[serde(rename = "yoyPct")]
    pub yoy_pct: Option<f64>,
    #[serde(rename = "momPct")]
    pub mom_pct: Option<f64>,
    #[serde(rename = "bedYoyPct")]
    pub bed_yoy_pct: Option<f64>,
    #[serde(rename = "bedMomPct")]
    pub bed_mom_pct: Option<f64>,
}

impl TimeseriesRow {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            revenue: None,
            last_year: None,
            yoy_pct: None,
            mom_pct: None,
            bed_yoy_pct: None,
            bed_mom_pct: None,
        }
    }
}

/// Aggregate metrics for the current filter/date window.
///
/// Percentages are `None` when the baseline period is zero or unavailable; they are
/// never NaN or infinite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryViewModel {
    pub current: f64,
    #[serde(rename = "growthRate")]
    pub growth_rate: Option<f64>,
    #[serde(rename = "momGrowthRate")]
    pub mom_growth_rate: Option<f64>,
    #[serde(rename = "bedGrowthRate")]
    pub bed_growth_rate: Option<f64>,
    #[serde(rename = "bedMomGrowthRate")]
    pub bed_mom_growth_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    #[serde(rename = "departmentCode")]
    pub department_code: Option<String>,
    #[serde(rename = "departmentName")]
    pub department_name: Option<String>,
}

/// Reference data returned by `{prefix}/init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitData {
    /// Server "today"; used as the default window end when present.
    pub date: Option<NaiveDate>,
    pub departments: Vec<Department>,
    pub doctors: Vec<Doctor>,
    pub summary: Option<SummaryViewModel>,
}

/// Request body shared by the summary, details and timeseries endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsQuery {
    #[serde(with = "date_format")]
    pub start_date: NaiveDate,
    #[serde(with = "date_format")]
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doctors: Vec<String>,
}

impl AnalyticsQuery {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            departments: Vec::new(),
            doctors: Vec::new(),
        }
    }

    /// Same filters over a different window.
    pub fn with_window(&self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            ..self.clone()
        }
    }

    /// Timeseries requests are not narrowed by doctor.
    pub fn without_doctors(&self) -> Self {
        Self {
            doctors: Vec::new(),
            ..self.clone()
        }
    }
}

/// User-controlled filters for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    #[serde(rename = "startDate", with = "date_format")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate", with = "date_format")]
    pub end_date: NaiveDate,
    #[serde(rename = "selectedDepartments")]
    pub selected_departments: BTreeSet<String>,
    #[serde(rename = "selectedDoctors")]
    pub selected_doctors: BTreeSet<String>,
}

impl FilterState {
    /// The trailing `window_days` ending `today`; 0 means today only.
    pub fn defaults(today: NaiveDate, window_days: u32) -> Self {
        let start_date = today
            .checked_sub_days(Days::new(u64::from(window_days.saturating_sub(1))))
            .unwrap_or(today);
        Self {
            start_date,
            end_date: today,
            selected_departments: BTreeSet::new(),
            selected_doctors: BTreeSet::new(),
        }
    }

    pub fn is_valid_window(&self) -> bool {
        self.start_date <= self.end_date
    }

    pub fn to_query(&self) -> AnalyticsQuery {
        AnalyticsQuery {
            start_date: self.start_date,
            end_date: self.end_date,
            departments: self.selected_departments.iter().cloned().collect(),
            doctors: self.selected_doctors.iter().cloned().collect(),
        }
    }
}

/// Parse an ISO date, tolerating a trailing time component (`2025-11-10T00:00:00`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }
}
