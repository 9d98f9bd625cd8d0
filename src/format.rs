//! Display formatting helpers
//!
//! Pure conversions from raw numbers to the strings shown in tables and cards. Absent
//! values render as [`PLACEHOLDER`] so a missing figure is never confused with zero.

use crate::models::{parse_date, DATE_FORMAT};

/// Shown in place of a missing value.
pub const PLACEHOLDER: &str = "-";

/// `1234567.891` -> `¥1,234,567.89`; `None` -> `-`.
pub fn format_currency(value: Option<f64>, symbol: &str) -> String {
    match finite(value) {
        Some(v) => {
            let sign = if v < 0.0 { "-" } else { "" };
            format!("{sign}{symbol}{}", group_thousands(v.abs(), 2))
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// Signed percentage with two decimals: `12.346` -> `+12.35%`.
pub fn format_percent(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v > 0.0 => format!("+{v:.2}%"),
        Some(v) => format!("{v:.2}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Plain number with grouping; integers print without decimals.
pub fn format_number(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v.fract() == 0.0 => {
            let sign = if v < 0.0 { "-" } else { "" };
            format!("{sign}{}", group_thousands(v.abs(), 0))
        }
        Some(v) => {
            let sign = if v < 0.0 { "-" } else { "" };
            format!("{sign}{}", group_thousands(v.abs(), 2))
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// Normalise a backend date to `YYYY-MM-DD`; unparseable input is shown as-is.
pub fn format_date(value: &str) -> String {
    match parse_date(value) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None if value.trim().is_empty() => PLACEHOLDER.to_string(),
        None => value.to_string(),
    }
}

/// Optional text cell.
pub fn text_or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
