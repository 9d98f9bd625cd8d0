//! Summary completion (month-over-month backfill)
//!
//! Some backends omit `mom_growth_rate`. When that happens the summary for the
//! immediately preceding window of the same length is fetched and the rate derived as
//! `(current - previous) / previous * 100`. A zero or missing baseline leaves the rate
//! `None`, and a failed backfill request degrades to `None` instead of failing the
//! summary.

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::api::AnalyticsBackend;
use crate::error::Result;
use crate::models::{AnalyticsQuery, SummaryViewModel};

/// Inclusive length of `[start, end]` in days; at least 1.
pub fn window_length_days(start: NaiveDate, end: NaiveDate) -> u64 {
    let days = (end - start).num_days() + 1;
    u64::try_from(days).unwrap_or(1).max(1)
}

/// The window of equal length ending the day before `start`.
///
/// Pure day arithmetic: a 30-day window starting on March 1st maps to the 30 days ending
/// on the last day of February, whatever the month lengths.
pub fn prior_window(start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let length = window_length_days(start, end);
    let prior_end = start.checked_sub_days(Days::new(1))?;
    let prior_start = prior_end.checked_sub_days(Days::new(length - 1))?;
    Some((prior_start, prior_end))
}

/// Percentage change from `previous` to `current`; `None` for a zero or non-finite base.
pub fn growth_rate(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0).filter(|rate| rate.is_finite())
}

/// Whether the summary still needs the prior-period request.
pub fn needs_backfill(summary: &SummaryViewModel) -> bool {
    summary.mom_growth_rate.is_none()
}

/// Derive the month-over-month rate for `summary` from the prior window.
///
/// Returns `None` when the rate cannot be derived, including when the request fails.
pub async fn backfill_mom<B>(backend: &B, query: &AnalyticsQuery, current: f64) -> Option<f64>
where
    B: AnalyticsBackend + ?Sized,
{
    let (prior_start, prior_end) = prior_window(query.start_date, query.end_date)?;
    let prior_query = query.with_window(prior_start, prior_end);

    match backend.summary(&prior_query).await {
        Ok(prior) => {
            let rate = growth_rate(current, prior.current);
            debug!(
                prior_start = %prior_start,
                prior_end = %prior_end,
                prior_current = prior.current,
                ?rate,
                "Derived month-over-month rate"
            );
            rate
        }
        Err(e) => {
            warn!(error = %e, "Prior-period summary failed, leaving month-over-month empty");
            None
        }
    }
}

/// Fill in a missing month-over-month rate; summaries that already have one pass through.
pub async fn complete_summary<B>(
    backend: &B,
    query: &AnalyticsQuery,
    mut summary: SummaryViewModel,
) -> SummaryViewModel
where
    B: AnalyticsBackend + ?Sized,
{
    if needs_backfill(&summary) {
        summary.mom_growth_rate = backfill_mom(backend, query, summary.current).await;
    }
    summary
}

/// Fetch the summary for `query` and complete it.
pub async fn load_summary<B>(backend: &B, query: &AnalyticsQuery) -> Result<SummaryViewModel>
where
    B: AnalyticsBackend + ?Sized,
{
    let primary = backend.summary(query).await?;
    Ok(complete_summary(backend, query, primary).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_length() {
        assert_eq!(window_length_days(date(2025, 11, 10), date(2025, 11, 10)), 1);
        assert_eq!(window_length_days(date(2025, 11, 10), date(2025, 11, 14)), 5);
        assert_eq!(window_length_days(date(2025, 11, 14), date(2025, 11, 10)), 1);
    }

    #[test]
    fn test_prior_window_same_day() {
        let prior = prior_window(date(2025, 11, 10), date(2025, 11, 10));
        assert_eq!(prior, Some((date(2025, 11, 9), date(2025, 11, 9))));
    }

    #[test]
    fn test_prior_window_range() {
        let prior = prior_window(date(2025, 11, 10), date(2025, 11, 14));
        assert_eq!(prior, Some((date(2025, 11, 5), date(2025, 11, 9))));
    }

    #[test]
    fn test_prior_window_crosses_month_boundary() {
        // March 2025 has 31 days; the prior window is the 31 days before March 1st.
        let prior = prior_window(date(2025, 3, 1), date(2025, 3, 31));
        assert_eq!(prior, Some((date(2025, 1, 29), date(2025, 2, 28))));
    }

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(120.0, 100.0), Some(20.0));
        assert_eq!(growth_rate(50.0, 100.0), Some(-50.0));
        assert_eq!(growth_rate(10.0, 0.0), None);
        assert_eq!(growth_rate(10.0, f64::NAN), None);
    }
}
