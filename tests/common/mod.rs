#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use hospital_analytics::api::{AnalyticsBackend, AnalyticsModule};
use hospital_analytics::error::{AnalyticsError, Result};
use hospital_analytics::models::{
    AnalyticsQuery, DetailPage, DetailRow, Department, Doctor, InitData, SummaryViewModel,
    TimeseriesRow,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn detail(date: &str, doctor: &str, revenue: Option<f64>) -> DetailRow {
    let mut row = DetailRow::new(date);
    row.department_code = Some("0101".to_string());
    row.department_name = Some("Cardiology".to_string());
    row.doctor_id = Some(doctor.to_string());
    row.doctor_name = Some(format!("Dr. {doctor}"));
    row.revenue = revenue;
    row
}

pub fn sample_details() -> DetailPage {
    let rows: Vec<DetailRow> = (1..=25)
        .map(|day| {
            let doctor = if day % 2 == 0 { "D01" } else { "D02" };
            detail(&format!("2025-11-{day:02}"), doctor, Some(f64::from(day) * 100.0))
        })
        .collect();
    DetailPage {
        total: rows.len(),
        rows,
    }
}

pub fn sample_init() -> InitData {
    InitData {
        date: Some(date(2025, 11, 14)),
        departments: vec![
            Department {
                code: "0101".to_string(),
                name: "Cardiology".to_string(),
            },
            Department {
                code: "0202".to_string(),
                name: "Neurology".to_string(),
            },
        ],
        doctors: vec![
            Doctor {
                id: "D01".to_string(),
                name: "Dr. Li".to_string(),
                department_code: Some("0101".to_string()),
                department_name: Some("Cardiology".to_string()),
            },
            Doctor {
                id: "D02".to_string(),
                name: "Dr. Wang".to_string(),
                department_code: Some("0202".to_string()),
                department_name: Some("Neurology".to_string()),
            },
        ],
        summary: None,
    }
}

pub fn summary(current: f64, mom: Option<f64>) -> SummaryViewModel {
    SummaryViewModel {
        current,
        growth_rate: Some(5.0),
        mom_growth_rate: mom,
        bed_growth_rate: None,
        bed_mom_growth_rate: None,
    }
}

pub fn refused<T>() -> Result<T> {
    Err(AnalyticsError::Network("connection refused".to_string()))
}

/// Scripted backend that records every request it receives.
pub struct FakeBackend {
    pub module: AnalyticsModule,
    pub init: Result<InitData>,
    pub summary: Result<SummaryViewModel>,
    /// Summaries keyed by window, taking precedence over `summary`.
    pub summaries: HashMap<(NaiveDate, NaiveDate), Result<SummaryViewModel>>,
    pub details: Result<DetailPage>,
    pub timeseries: Result<Vec<TimeseriesRow>>,
    pub calls: Mutex<Vec<(&'static str, Option<AnalyticsQuery>)>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            module: AnalyticsModule::Outpatient,
            init: Ok(sample_init()),
            summary: Ok(summary(1000.0, Some(2.0))),
            summaries: HashMap::new(),
            details: Ok(sample_details()),
            timeseries: Ok(vec![TimeseriesRow::new("2025-11-10")]),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn offline() -> Self {
        Self {
            init: refused(),
            summary: refused(),
            details: refused(),
            timeseries: refused(),
            ..Self::default()
        }
    }

    fn record(&self, endpoint: &'static str, query: Option<&AnalyticsQuery>) {
        self.calls.lock().unwrap().push((endpoint, query.cloned()));
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Option<AnalyticsQuery>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

#[async_trait]
impl AnalyticsBackend for FakeBackend {
    fn module(&self) -> AnalyticsModule {
        self.module
    }

    async fn init(&self) -> Result<InitData> {
        self.record("init", None);
        self.init.clone()
    }

    async fn summary(&self, query: &AnalyticsQuery) -> Result<SummaryViewModel> {
        self.record("summary", Some(query));
        self.summaries
            .get(&(query.start_date, query.end_date))
            .cloned()
            .unwrap_or_else(|| self.summary.clone())
    }

    async fn details(&self, query: &AnalyticsQuery) -> Result<DetailPage> {
        self.record("details", Some(query));
        self.details.clone()
    }

    async fn timeseries(&self, query: &AnalyticsQuery) -> Result<Vec<TimeseriesRow>> {
        self.record("timeseries", Some(query));
        self.timeseries.clone()
    }
}
