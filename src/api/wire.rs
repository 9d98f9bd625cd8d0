//! Raw response shapes and their normalisation
//!
//! The backend is loose about field names and number encodings: the same column can
//! arrive as `dep_id` or `department_code`, and a revenue figure can be a JSON number,
//! a numeric string or `"-"`. This module accepts all of those spellings once, here, and
//! hands the rest of the crate the canonical types from [`crate::models`].
//!
//! ## Envelope
//!
//! Every body is a JSON object with an optional `success` flag. `success: false` is an
//! application error even on HTTP 200; the server `error` string is surfaced when
//! present, otherwise a module-specific fallback. A missing flag counts as success.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{AnalyticsError, Result};
use crate::models::{
    parse_date, DetailPage, DetailRow, Department, Doctor, InitData, SummaryViewModel,
    TimeseriesRow,
};

/// Check the envelope and decode the body into `T`.
pub fn decode<T: DeserializeOwned>(body: Value, fallback: &str) -> Result<T> {
    let Value::Object(ref map) = body else {
        return Err(AnalyticsError::Decode("response body is not a JSON object".to_string()));
    };

    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = map
            .get("error")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| fallback.to_string(), str::to_string);
        return Err(AnalyticsError::Application(message));
    }

    Ok(serde_json::from_value(body)?)
}

#[derive(Debug, Deserialize)]
pub struct RawInit {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub departments: Vec<RawDepartment>,
    #[serde(default)]
    pub doctors: Vec<RawDoctor>,
    #[serde(default)]
    pub summary: Option<RawSummary>,
}

#[derive(Debug, Deserialize)]
pub struct RawDepartment {
    #[serde(default, alias = "dep_id", alias = "dept_code", alias = "id", deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, alias = "dep_name", alias = "dept_name", deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawDoctor {
    #[serde(default, alias = "doctor_id", alias = "doctorId", alias = "id", deserialize_with = "lenient_string")]
    pub doc_id: Option<String>,
    #[serde(default, alias = "doctor_name", alias = "doctorName", alias = "name", deserialize_with = "lenient_string")]
    pub doc_name: Option<String>,
    #[serde(default, alias = "department_code", alias = "dept_code", deserialize_with = "lenient_string")]
    pub dep_id: Option<String>,
    #[serde(default, alias = "department_name", alias = "dept_name", deserialize_with = "lenient_string")]
    pub dep_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSummary {
    #[serde(default, alias = "total", alias = "value", deserialize_with = "lenient_f64")]
    pub current: Option<f64>,
    #[serde(default, alias = "yoy_growth_rate", alias = "growthRate", deserialize_with = "lenient_f64")]
    pub growth_rate: Option<f64>,
    #[serde(default, alias = "momGrowthRate", deserialize_with = "lenient_f64")]
    pub mom_growth_rate: Option<f64>,
    #[serde(default, alias = "bedGrowthRate", deserialize_with = "lenient_f64")]
    pub bed_growth_rate: Option<f64>,
    #[serde(default, alias = "bedMomGrowthRate", deserialize_with = "lenient_f64")]
    pub bed_mom_growth_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawSummaryResponse {
    pub summary: Option<RawSummary>,
}

#[derive(Debug, Deserialize)]
pub struct RawDetailRow {
    #[serde(default, alias = "stat_date", alias = "day", deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(
        default,
        alias = "dep_id",
        alias = "dept_code",
        alias = "departmentCode",
        deserialize_with = "lenient_string"
    )]
    pub department_code: Option<String>,
    #[serde(
        default,
        alias = "dep_name",
        alias = "dept_name",
        alias = "departmentName",
        deserialize_with = "lenient_string"
    )]
    pub department_name: Option<String>,
    #[serde(default, alias = "doc_id", alias = "doctorId", deserialize_with = "lenient_string")]
    pub doctor_id: Option<String>,
    #[serde(default, alias = "doc_name", alias = "doctorName", deserialize_with = "lenient_string")]
    pub doctor_name: Option<String>,
    #[serde(default, alias = "amount", alias = "value", deserialize_with = "lenient_f64")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: Option<f64>,
    #[serde(default, alias = "qty", alias = "count", deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default, alias = "yoy", alias = "yoyPct", deserialize_with = "lenient_f64")]
    pub yoy_pct: Option<f64>,
    #[serde(default, alias = "mom", alias = "momPct", deserialize_with = "lenient_f64")]
    pub mom_pct: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawDetailsResponse {
    #[serde(default)]
    pub rows: Vec<RawDetailRow>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RawTimeseriesRow {
    #[serde(default, alias = "stat_date", alias = "day", deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, alias = "amount", alias = "value", deserialize_with = "lenient_f64")]
    pub revenue: Option<f64>,
    #[serde(default, alias = "last_year_revenue", alias = "lastYear", deserialize_with = "lenient_f64")]
    pub last_year: Option<f64>,
    #[serde(default, alias = "yoy", alias = "yoyPct", deserialize_with = "lenient_f64")]
    pub yoy_pct: Option<f64>,
    #[serde(default, alias = "mom", alias = "momPct", deserialize_with = "lenient_f64")]
    pub mom_pct: Option<f64>,
    #[serde(default, alias = "bedYoyPct", deserialize_with = "lenient_f64")]
    pub bed_yoy_pct: Option<f64>,
    #[serde(default, alias = "bedMomPct", deserialize_with = "lenient_f64")]
    pub bed_mom_pct: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawTimeseriesResponse {
    #[serde(default)]
    pub rows: Vec<RawTimeseriesRow>,
}

impl From<RawSummary> for SummaryViewModel {
    fn from(raw: RawSummary) -> Self {
        Self {
            current: raw.current.unwrap_or(0.0),
            growth_rate: raw.growth_rate,
            mom_growth_rate: raw.mom_growth_rate,
            bed_growth_rate: raw.bed_growth_rate,
            bed_mom_growth_rate: raw.bed_mom_growth_rate,
        }
    }
}

impl From<RawInit> for InitData {
    fn from(raw: RawInit) -> Self {
        let departments = raw
            .departments
            .into_iter()
            .filter_map(|d| {
                let code = d.code.or_else(|| d.name.clone())?;
                let name = d.name.unwrap_or_else(|| code.clone());
                Some(Department { code, name })
            })
            .collect();

        let doctors = raw
            .doctors
            .into_iter()
            .filter_map(|d| {
                let id = d.doc_id?;
                Some(Doctor {
                    name: d.doc_name.unwrap_or_else(|| id.clone()),
                    id,
                    department_code: d.dep_id,
                    department_name: d.dep_name,
                })
            })
            .collect();

        Self {
            date: raw.date.as_deref().and_then(parse_date),
            departments,
            doctors,
            summary: raw.summary.map(SummaryViewModel::from),
        }
    }
}

impl RawDetailRow {
    fn into_row(self) -> Option<DetailRow> {
        Some(DetailRow {
            date: self.date?,
            department_code: self.department_code,
            department_name: self.department_name,
            doctor_id: self.doctor_id,
            doctor_name: self.doctor_name,
            revenue: self.revenue,
            cost: self.cost,
            quantity: self.quantity,
            yoy_pct: self.yoy_pct,
            mom_pct: self.mom_pct,
        })
    }
}

impl RawTimeseriesRow {
    fn into_row(self) -> Option<TimeseriesRow> {
        Some(TimeseriesRow {
            date: self.date?,
            revenue: self.revenue,
            last_year: self.last_year,
            yoy_pct: self.yoy_pct,
            mom_pct: self.mom_pct,
            bed_yoy_pct: self.bed_yoy_pct,
            bed_mom_pct: self.bed_mom_pct,
        })
    }
}

pub fn normalize_summary(raw: RawSummaryResponse) -> Result<SummaryViewModel> {
    raw.summary
        .map(SummaryViewModel::from)
        .ok_or_else(|| AnalyticsError::Decode("response has no summary".to_string()))
}

/// Drops rows without a date; `total` falls back to the surviving row count.
pub fn normalize_details(raw: RawDetailsResponse) -> DetailPage {
    let received = raw.rows.len();
    let rows: Vec<DetailRow> = raw.rows.into_iter().filter_map(RawDetailRow::into_row).collect();
    if rows.len() < received {
        warn!(dropped = received - rows.len(), "Detail rows without a date were dropped");
    }
    let total = raw.total.unwrap_or(rows.len());
    DetailPage { rows, total }
}

pub fn normalize_timeseries(raw: RawTimeseriesResponse) -> Vec<TimeseriesRow> {
    let received = raw.rows.len();
    let rows: Vec<TimeseriesRow> = raw
        .rows
        .into_iter()
        .filter_map(RawTimeseriesRow::into_row)
        .collect();
    if rows.len() < received {
        warn!(dropped = received - rows.len(), "Timeseries rows without a date were dropped");
    }
    rows
}

/// Number, numeric string (`"1,234.5"`, `"12%"`), or nothing.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().trim_end_matches('%').replace(',', "");
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<usize>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize))
}
