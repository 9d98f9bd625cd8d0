//! Trend series builder
//!
//! Reshapes timeseries rows into the `{labels, datasets}` form a chart renderer consumes.
//! Missing values become `0.0` here, unlike tables where they render as "-".

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::models::TimeseriesRow;

/// Which growth comparison the chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    /// Year over year.
    #[default]
    Yoy,
    /// Month over month.
    Mom,
}

impl TrendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yoy => "yoy",
            Self::Mom => "mom",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Yoy => Self::Mom,
            Self::Mom => Self::Yoy,
        }
    }

    fn growth(self, row: &TimeseriesRow) -> Option<f64> {
        match self {
            Self::Yoy => row.yoy_pct,
            Self::Mom => row.mom_pct,
        }
    }

    fn bed_growth(self, row: &TimeseriesRow) -> Option<f64> {
        match self {
            Self::Yoy => row.bed_yoy_pct,
            Self::Mom => row.bed_mom_pct,
        }
    }

    fn growth_label(self) -> &'static str {
        match self {
            Self::Yoy => "YoY growth %",
            Self::Mom => "MoM growth %",
        }
    }

    fn bed_growth_label(self) -> &'static str {
        match self {
            Self::Yoy => "Bed-day YoY %",
            Self::Mom => "Bed-day MoM %",
        }
    }
}

impl fmt::Display for TrendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yoy" => Ok(Self::Yoy),
            "mom" => Ok(Self::Mom),
            other => Err(format!("unknown trend mode '{other}', expected 'yoy' or 'mom'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Chart-ready series; `datasets[n].data[i]` belongs to `labels[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn dataset(&self, label: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.label == label)
    }
}

/// Build the chart for `rows` under `mode`.
///
/// Always produces a revenue dataset and a growth dataset for the mode; a bed-day growth
/// dataset is added when any row carries bed-day figures.
pub fn build_trend_series(rows: &[TimeseriesRow], mode: TrendMode) -> ChartData {
    let labels = rows.iter().map(|row| row.date.clone()).collect();

    let mut datasets = vec![
        series("Revenue", rows, |row| row.revenue),
        series(mode.growth_label(), rows, |row| mode.growth(row)),
    ];

    let has_bed_metrics = rows
        .iter()
        .any(|row| row.bed_yoy_pct.is_some() || row.bed_mom_pct.is_some());
    if has_bed_metrics {
        datasets.push(series(mode.bed_growth_label(), rows, |row| mode.bed_growth(row)));
    }

    ChartData { labels, datasets }
}

fn series<F>(label: &str, rows: &[TimeseriesRow], value_of: F) -> Dataset
where
    F: Fn(&TimeseriesRow) -> Option<f64>,
{
    Dataset {
        label: label.to_string(),
        data: rows
            .iter()
            .map(|row| value_of(row).filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect(),
    }
}
