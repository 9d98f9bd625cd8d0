//! CSV export of processed detail rows.
//!
//! Writes every row after filter and sort, not just the visible page. Absent values are
//! empty cells.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::models::DetailRow;

pub const COLUMNS: [&str; 10] = [
    "date",
    "department_code",
    "department_name",
    "doctor_id",
    "doctor_name",
    "revenue",
    "cost",
    "quantity",
    "yoy_pct",
    "mom_pct",
];

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    date: &'a str,
    department_code: Option<&'a str>,
    department_name: Option<&'a str>,
    doctor_id: Option<&'a str>,
    doctor_name: Option<&'a str>,
    revenue: Option<f64>,
    cost: Option<f64>,
    quantity: Option<f64>,
    yoy_pct: Option<f64>,
    mom_pct: Option<f64>,
}

impl<'a> From<&'a DetailRow> for CsvRecord<'a> {
    fn from(row: &'a DetailRow) -> Self {
        Self {
            date: &row.date,
            department_code: row.department_code.as_deref(),
            department_name: row.department_name.as_deref(),
            doctor_id: row.doctor_id.as_deref(),
            doctor_name: row.doctor_name.as_deref(),
            revenue: row.revenue,
            cost: row.cost,
            quantity: row.quantity,
            yoy_pct: row.yoy_pct,
            mom_pct: row.mom_pct,
        }
    }
}

/// Write `rows` after a header line, even when there are none; returns the row count.
pub fn write_details<W: Write>(writer: W, rows: &[DetailRow]) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(COLUMNS)
        .context("Failed to write CSV header")?;
    for row in rows {
        csv_writer
            .serialize(CsvRecord::from(row))
            .with_context(|| format!("Failed to write CSV row for {}", row.date))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(rows.len())
}

pub fn export_details(path: &Path, rows: &[DetailRow]) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let written = write_details(file, rows)?;
    info!(path = %path.display(), rows = written, "Exported detail rows");
    Ok(written)
}
