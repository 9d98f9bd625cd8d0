//! Sort comparator
//!
//! Type-aware ordering for table rows. A row type exposes its sortable fields through an
//! accessor returning a [`SortValue`]; [`sort_rows`] then produces a new, stably sorted
//! vector and never touches its input.
//!
//! ## Ordering rules
//!
//! - **Numbers** compare as floats. Missing values (and NaN) always sort last, in both
//!   directions.
//! - **Dates** compare chronologically. Missing or malformed dates count as the empty
//!   string: first when ascending, last when descending.
//! - **Text** compares by a collation key: canonical decomposition with combining marks
//!   removed, then lowercased, so "Émergence" sits with the other E words. Ties fall
//!   back to accent-aware and then case-sensitive comparison so the order stays total.
//!   Missing text is the empty string.
//!
//! Equal keys keep their original relative order.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{parse_date, DetailRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// A single field value as seen by the comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(Option<f64>),
    Date(Option<NaiveDate>),
    Text(Option<&'a str>),
}

impl<'a> SortValue<'a> {
    pub fn number(value: Option<f64>) -> Self {
        Self::Number(value.filter(|v| !v.is_nan()))
    }

    pub fn date(value: &str) -> Self {
        Self::Date(parse_date(value))
    }

    pub fn text(value: Option<&'a str>) -> Self {
        Self::Text(value)
    }
}

/// Compare two values under `direction`.
///
/// Values of different kinds compare equal; accessors are expected to return the same
/// kind for a given key.
pub fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortValue::Number(a), SortValue::Number(b)) => match (a, b) {
            (Some(a), Some(b)) => {
                direction.apply(a.partial_cmp(b).unwrap_or(Ordering::Equal))
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        (SortValue::Date(a), SortValue::Date(b)) => direction.apply(a.cmp(b)),
        (SortValue::Text(a), SortValue::Text(b)) => {
            direction.apply(compare_text(a.unwrap_or(""), b.unwrap_or("")))
        }
        _ => Ordering::Equal,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(collation_key(b))
        .then_with(|| {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| a.cmp(b))
}

/// Base letters only: decomposed, marks dropped, lowercased.
fn collation_key(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Return a stably sorted copy of `rows`.
pub fn sort_rows<T, F>(rows: &[T], direction: SortDirection, value_of: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> SortValue<'_>,
{
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| compare_values(&value_of(a), &value_of(b), direction));
    sorted
}

/// Current sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Header click: the same key flips direction, a new key starts ascending.
    pub fn toggle(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Sortable columns of the detail table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailSortKey {
    #[default]
    Date,
    Department,
    Doctor,
    Revenue,
    Cost,
    Quantity,
    Yoy,
    Mom,
}

impl DetailSortKey {
    pub const ALL: [DetailSortKey; 8] = [
        Self::Date,
        Self::Department,
        Self::Doctor,
        Self::Revenue,
        Self::Cost,
        Self::Quantity,
        Self::Yoy,
        Self::Mom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Department => "department",
            Self::Doctor => "doctor",
            Self::Revenue => "revenue",
            Self::Cost => "cost",
            Self::Quantity => "quantity",
            Self::Yoy => "yoy",
            Self::Mom => "mom",
        }
    }

    /// Accessor used by [`sort_rows`] for detail rows.
    pub fn value(self, row: &DetailRow) -> SortValue<'_> {
        match self {
            Self::Date => SortValue::date(&row.date),
            Self::Department => {
                SortValue::text(row.department_name.as_deref().or(row.department_code.as_deref()))
            }
            Self::Doctor => {
                SortValue::text(row.doctor_name.as_deref().or(row.doctor_id.as_deref()))
            }
            Self::Revenue => SortValue::number(row.revenue),
            Self::Cost => SortValue::number(row.cost),
            Self::Quantity => SortValue::number(row.quantity),
            Self::Yoy => SortValue::number(row.yoy_pct),
            Self::Mom => SortValue::number(row.mom_pct),
        }
    }
}

impl fmt::Display for DetailSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == lowered)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown sort key '{s}', expected one of: {}", valid.join(", "))
            })
    }
}

/// Sort detail rows by one of the table columns.
pub fn sort_details(rows: &[DetailRow], state: SortState<DetailSortKey>) -> Vec<DetailRow> {
    sort_rows(rows, state.direction, |row| state.key.value(row))
}
