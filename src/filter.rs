//! Row filters
//!
//! Every filter in the application follows the same rule: an empty selection means
//! "all categories included", never "exclude everything".

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::{DetailRow, Doctor};

/// Keep the rows whose id is in `selected`; an empty selection keeps every row.
///
/// Rows without an id are dropped as soon as a selection is active.
pub fn filter_by_ids<T, F>(rows: &[T], selected: &BTreeSet<String>, id_of: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Option<&str>,
{
    if selected.is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .filter(|row| id_of(row).is_some_and(|id| selected.contains(id)))
        .cloned()
        .collect()
}

pub fn filter_by_doctors(rows: &[DetailRow], selected: &BTreeSet<String>) -> Vec<DetailRow> {
    filter_by_ids(rows, selected, |row| row.doctor_id.as_deref())
}

/// Departments may be selected by code or by name; both are matched.
pub fn filter_by_departments(rows: &[DetailRow], selected: &BTreeSet<String>) -> Vec<DetailRow> {
    if selected.is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .filter(|row| {
            [row.department_code.as_deref(), row.department_name.as_deref()]
                .into_iter()
                .flatten()
                .any(|key| selected.contains(key))
        })
        .cloned()
        .collect()
}

/// Doctor options narrowed to the selected departments (matched by code or name).
pub fn doctors_in_departments(doctors: &[Doctor], departments: &BTreeSet<String>) -> Vec<Doctor> {
    if departments.is_empty() {
        return doctors.to_vec();
    }

    doctors
        .iter()
        .filter(|doctor| {
            [doctor.department_code.as_deref(), doctor.department_name.as_deref()]
                .into_iter()
                .flatten()
                .any(|key| departments.contains(key))
        })
        .cloned()
        .collect()
}

/// Rows whose date falls inside `[start, end]`; unparseable dates are excluded.
pub fn filter_by_window(rows: &[DetailRow], start: NaiveDate, end: NaiveDate) -> Vec<DetailRow> {
    rows.iter()
        .filter(|row| {
            row.parsed_date()
                .is_some_and(|date| date >= start && date <= end)
        })
        .cloned()
        .collect()
}
