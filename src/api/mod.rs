//! Analytics API boundary
//!
//! Every analytics page talks to the same four endpoints under its own prefix:
//!
//! - `GET  {prefix}/init` - departments, doctors, server date, optional summary
//! - `POST {prefix}/summary` - aggregate metrics for a window
//! - `POST {prefix}/details` - the full line-item result set
//! - `POST {prefix}/timeseries` - one trend point per date
//!
//! [`AnalyticsBackend`] is the seam the page controller depends on; [`client::HttpBackend`]
//! is the reqwest implementation and [`wire`] holds the raw JSON shapes and their
//! normalisation into [`crate::models`].

pub mod client;
pub mod wire;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::ModulesConfig;
use crate::error::Result;
use crate::models::{AnalyticsQuery, DetailPage, InitData, SummaryViewModel, TimeseriesRow};

pub use client::HttpBackend;

/// The analytics page families served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyticsModule {
    #[default]
    Outpatient,
    Inpatient,
    Workload,
    DrugCost,
    Prescription,
}

impl AnalyticsModule {
    pub const ALL: [AnalyticsModule; 5] = [
        Self::Outpatient,
        Self::Inpatient,
        Self::Workload,
        Self::DrugCost,
        Self::Prescription,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outpatient => "outpatient",
            Self::Inpatient => "inpatient",
            Self::Workload => "workload",
            Self::DrugCost => "drug-cost",
            Self::Prescription => "prescription",
        }
    }

    /// Human name used in headings and fallback error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Outpatient => "outpatient revenue",
            Self::Inpatient => "inpatient revenue",
            Self::Workload => "department workload",
            Self::DrugCost => "drug cost",
            Self::Prescription => "prescription management",
        }
    }

    /// Inpatient pages report bed-day growth next to revenue growth.
    pub fn has_bed_metrics(self) -> bool {
        matches!(self, Self::Inpatient)
    }

    pub fn prefix(self, modules: &ModulesConfig) -> &str {
        match self {
            Self::Outpatient => &modules.outpatient,
            Self::Inpatient => &modules.inpatient,
            Self::Workload => &modules.workload,
            Self::DrugCost => &modules.drug_cost,
            Self::Prescription => &modules.prescription,
        }
    }
}

impl fmt::Display for AnalyticsModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticsModule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|module| module.as_str() == lowered)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown module '{s}', expected one of: {}", valid.join(", "))
            })
    }
}

/// The four endpoints every module exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Init,
    Summary,
    Details,
    Timeseries,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Summary => "summary",
            Self::Details => "details",
            Self::Timeseries => "timeseries",
        }
    }

    /// Message used when the backend reports failure without an `error` string.
    pub fn fallback_message(self, module: AnalyticsModule) -> String {
        let what = match self {
            Self::Init => "filter options",
            Self::Summary => "summary",
            Self::Details => "details",
            Self::Timeseries => "trend data",
        };
        format!("failed to load {} {what}", module.label())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Data source for one analytics module.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    fn module(&self) -> AnalyticsModule;

    async fn init(&self) -> Result<InitData>;

    async fn summary(&self, query: &AnalyticsQuery) -> Result<SummaryViewModel>;

    async fn details(&self, query: &AnalyticsQuery) -> Result<DetailPage>;

    async fn timeseries(&self, query: &AnalyticsQuery) -> Result<Vec<TimeseriesRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_parsing() {
        assert_eq!("drug_cost".parse::<AnalyticsModule>(), Ok(AnalyticsModule::DrugCost));
        assert_eq!("Inpatient".parse::<AnalyticsModule>(), Ok(AnalyticsModule::Inpatient));
        assert!("radiology".parse::<AnalyticsModule>().is_err());
    }

    #[test]
    fn test_prefix_lookup() {
        let modules = ModulesConfig::default();
        assert_eq!(AnalyticsModule::Outpatient.prefix(&modules), "/api/outpatient-revenue");
        assert_eq!(AnalyticsModule::Prescription.prefix(&modules), "/api/prescription");
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            Endpoint::Details.fallback_message(AnalyticsModule::Outpatient),
            "failed to load outpatient revenue details"
        );
        assert_eq!(
            Endpoint::Timeseries.fallback_message(AnalyticsModule::Workload),
            "failed to load department workload trend data"
        );
    }
}
