//! Page controller
//!
//! [`PageController`] is the view model behind one analytics page. It owns the filter,
//! sort and page state, issues the summary/details/timeseries requests for a query and
//! exposes the processed table, summary cards and chart series.
//!
//! ## Query lifecycle
//!
//! 1. [`PageController::begin_query`] validates the filter and hands out a [`QueryTicket`]
//! 2. [`fetch_outcome`] runs the requested sections concurrently and collects a [`QueryOutcome`]
//! 3. [`PageController::apply_outcome`] installs it, unless a newer ticket exists
//! 4. [`PageController::backfill`] derives a missing month-over-month rate afterwards
//!
//! [`PageController::submit`] runs all four steps for every section;
//! [`PageController::submit_sections`] limits the query to the sections a caller shows.
//! The steps are public so a caller driving several queries at once can interleave
//! them; only the latest ticket's data is ever shown.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info, warn, Instrument};

use crate::api::AnalyticsBackend;
use crate::error::{AnalyticsError, Result};
use crate::filter::doctors_in_departments;
use crate::logging::query_span;
use crate::models::{
    AnalyticsQuery, DetailPage, DetailRow, Department, Doctor, FilterState, SummaryViewModel,
    TimeseriesRow,
};
use crate::paginate::PageState;
use crate::sort::{DetailSortKey, SortDirection, SortState};
use crate::summary;
use crate::table::{self, TableView};
use crate::trend::{build_trend_series, ChartData, TrendMode};

/// Which page sections a query fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub summary: bool,
    pub details: bool,
    pub timeseries: bool,
}

impl Sections {
    pub const ALL: Self = Self {
        summary: true,
        details: true,
        timeseries: true,
    };
    pub const SUMMARY: Self = Self {
        summary: true,
        details: false,
        timeseries: false,
    };
    pub const DETAILS: Self = Self {
        summary: false,
        details: true,
        timeseries: false,
    };
    pub const TIMESERIES: Self = Self {
        summary: false,
        details: false,
        timeseries: true,
    };
}

impl Default for Sections {
    fn default() -> Self {
        Self::ALL
    }
}

/// A submitted query and the ticket that identifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub id: u64,
    pub query: AnalyticsQuery,
    pub sections: Sections,
}

/// Results of the section requests for one ticket; `None` for a section not requested.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub ticket: u64,
    pub summary: Option<Result<SummaryViewModel>>,
    pub details: Option<Result<DetailPage>>,
    pub timeseries: Option<Result<Vec<TimeseriesRow>>>,
}

impl QueryOutcome {
    pub fn errors(&self) -> Vec<&AnalyticsError> {
        [
            self.summary.as_ref().and_then(|r| r.as_ref().err()),
            self.details.as_ref().and_then(|r| r.as_ref().err()),
            self.timeseries.as_ref().and_then(|r| r.as_ref().err()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Issue the requests for `ticket`'s sections concurrently.
///
/// Timeseries are never narrowed by doctor. The summary is the primary response only;
/// month-over-month completion happens in [`PageController::backfill`].
pub async fn fetch_outcome<B>(backend: &B, ticket: &QueryTicket) -> QueryOutcome
where
    B: AnalyticsBackend + ?Sized,
{
    let sections = ticket.sections;
    let trend_query = ticket.query.without_doctors();
    let (summary, details, timeseries) = tokio::join!(
        async {
            if sections.summary {
                Some(backend.summary(&ticket.query).await)
            } else {
                None
            }
        },
        async {
            if sections.details {
                Some(backend.details(&ticket.query).await)
            } else {
                None
            }
        },
        async {
            if sections.timeseries {
                Some(backend.timeseries(&trend_query).await)
            } else {
                None
            }
        },
    );

    QueryOutcome {
        ticket: ticket.id,
        summary,
        details,
        timeseries,
    }
}

pub struct PageController<B> {
    backend: B,
    filter: FilterState,
    sort: SortState<DetailSortKey>,
    page: PageState,
    trend_mode: TrendMode,
    window_days: u32,

    server_date: Option<NaiveDate>,
    departments: Vec<Department>,
    doctors: Vec<Doctor>,

    details: DetailPage,
    summary: Option<SummaryViewModel>,
    timeseries: Vec<TimeseriesRow>,

    error: Option<String>,
    loading: bool,
    latest_ticket: u64,
}

impl<B: AnalyticsBackend> PageController<B> {
    pub fn new(backend: B, page_size: usize, window_days: u32, today: NaiveDate) -> Self {
        Self {
            backend,
            filter: FilterState::defaults(today, window_days),
            sort: SortState::new(DetailSortKey::Date, SortDirection::Ascending),
            page: PageState::new(page_size),
            trend_mode: TrendMode::default(),
            window_days,
            server_date: None,
            departments: Vec::new(),
            doctors: Vec::new(),
            details: DetailPage::default(),
            summary: None,
            timeseries: Vec::new(),
            error: None,
            loading: false,
            latest_ticket: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load filter options and the server date.
    ///
    /// The server date replaces the local one as the default window end. On failure the
    /// option lists stay empty and the banner is set; the page stays usable.
    pub async fn load_init(&mut self) -> Result<()> {
        match self.backend.init().await {
            Ok(init) => {
                info!(
                    module = %self.backend.module(),
                    departments = init.departments.len(),
                    doctors = init.doctors.len(),
                    "Loaded filter options"
                );
                if let Some(date) = init.date {
                    self.server_date = Some(date);
                    self.filter = FilterState::defaults(date, self.window_days);
                }
                self.departments = init.departments;
                self.doctors = init.doctors;
                if init.summary.is_some() {
                    self.summary = init.summary;
                }
                Ok(())
            }
            Err(e) => {
                warn!(module = %self.backend.module(), error = %e, "Init failed");
                self.departments.clear();
                self.doctors.clear();
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Check the current filter without sending anything.
    pub fn validate_query(&self) -> Result<AnalyticsQuery> {
        if !self.filter.is_valid_window() {
            return Err(AnalyticsError::InvalidQuery(format!(
                "start date {} is after end date {}",
                self.filter.start_date, self.filter.end_date
            )));
        }
        Ok(self.filter.to_query())
    }

    /// Validate the filter and reserve the next ticket for every section.
    pub fn begin_query(&mut self) -> Result<QueryTicket> {
        self.begin_query_for(Sections::ALL)
    }

    pub fn begin_query_for(&mut self, sections: Sections) -> Result<QueryTicket> {
        let query = match self.validate_query() {
            Ok(query) => query,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        self.latest_ticket += 1;
        self.loading = true;
        self.page.reset();

        Ok(QueryTicket {
            id: self.latest_ticket,
            query,
            sections,
        })
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest_ticket
    }

    /// Install an outcome. Returns `false` when the ticket is stale and nothing changed.
    pub fn apply_outcome(&mut self, outcome: QueryOutcome) -> bool {
        if !self.is_current(outcome.ticket) {
            debug!(
                ticket = outcome.ticket,
                latest = self.latest_ticket,
                "Discarding stale query outcome"
            );
            return false;
        }

        let mut messages: Vec<String> = Vec::new();
        for error in outcome.errors() {
            let message = error.user_message();
            if !messages.contains(&message) {
                messages.push(message);
            }
        }

        // Sections left out of the query are cleared so nothing from an older window lingers.
        match outcome.summary {
            Some(Ok(summary)) => self.summary = Some(summary),
            Some(Err(e)) => {
                warn!(section = "summary", error = %e, "Section failed");
                self.summary = None;
            }
            None => self.summary = None,
        }
        match outcome.details {
            Some(Ok(details)) => self.details = details,
            Some(Err(e)) => {
                warn!(section = "details", error = %e, "Section failed");
                self.details = DetailPage::default();
            }
            None => self.details = DetailPage::default(),
        }
        match outcome.timeseries {
            Some(Ok(series)) => self.timeseries = series,
            Some(Err(e)) => {
                warn!(section = "timeseries", error = %e, "Section failed");
                self.timeseries.clear();
            }
            None => self.timeseries.clear(),
        }

        self.error = if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        };
        self.loading = false;
        self.sync_page();
        true
    }

    /// Fill in a missing month-over-month rate for `ticket`'s summary.
    ///
    /// Runs after the primary outcome is applied so the other summary fields are already
    /// visible. A stale ticket or a complete summary makes this a no-op.
    pub async fn backfill(&mut self, ticket: &QueryTicket) {
        let current = match &self.summary {
            Some(summary) if self.is_current(ticket.id) && summary::needs_backfill(summary) => {
                summary.current
            }
            _ => return,
        };

        let rate = summary::backfill_mom(&self.backend, &ticket.query, current).await;
        self.apply_backfill(ticket.id, rate);
    }

    pub fn apply_backfill(&mut self, ticket: u64, rate: Option<f64>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match self.summary.as_mut() {
            Some(summary) => {
                summary.mom_growth_rate = rate;
                true
            }
            None => false,
        }
    }

    /// Validate, fetch, apply and backfill the current filter for every section.
    ///
    /// Only an invalid query is returned as an error; section failures land in
    /// [`PageController::error`].
    pub async fn submit(&mut self) -> Result<()> {
        self.submit_sections(Sections::ALL).await
    }

    /// Like [`PageController::submit`], fetching only `sections`.
    pub async fn submit_sections(&mut self, sections: Sections) -> Result<()> {
        let ticket = self.begin_query_for(sections)?;
        let span = query_span(self.backend.module().as_str(), ticket.id);

        async {
            info!(
                start = %ticket.query.start_date,
                end = %ticket.query.end_date,
                departments = ticket.query.departments.len(),
                doctors = ticket.query.doctors.len(),
                "Submitting query"
            );
            let outcome = fetch_outcome(&self.backend, &ticket).await;
            if self.apply_outcome(outcome) {
                self.backfill(&ticket).await;
            }
        }
        .instrument(span)
        .await;

        Ok(())
    }

    /// Current page of the detail table after doctor filter, sort and pagination.
    pub fn view(&self) -> TableView<DetailRow> {
        table::process(
            &self.details.rows,
            &self.filter.selected_doctors,
            self.sort,
            self.page,
        )
    }

    /// Every row after filter and sort; what an export writes.
    pub fn processed_rows(&self) -> Vec<DetailRow> {
        table::filter_and_sort(&self.details.rows, &self.filter.selected_doctors, self.sort)
    }

    pub fn chart(&self) -> ChartData {
        build_trend_series(&self.timeseries, self.trend_mode)
    }

    pub fn toggle_sort(&mut self, key: DetailSortKey) {
        self.sort.toggle(key);
        self.page.reset();
    }

    pub fn set_sort(&mut self, sort: SortState<DetailSortKey>) {
        self.sort = sort;
        self.page.reset();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page = PageState::new(page_size);
        self.sync_page();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.sync_page();
        self.page.go_to(page);
    }

    pub fn next_page(&mut self) {
        self.sync_page();
        self.page.next();
    }

    pub fn previous_page(&mut self) {
        self.sync_page();
        self.page.previous();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            let e = AnalyticsError::InvalidQuery(format!(
                "start date {start} is after end date {end}"
            ));
            self.error = Some(e.user_message());
            return Err(e);
        }
        self.filter.start_date = start;
        self.filter.end_date = end;
        self.page.reset();
        Ok(())
    }

    /// Select departments; doctors outside them are deselected.
    pub fn select_departments(&mut self, departments: BTreeSet<String>) {
        self.filter.selected_departments = departments;
        if !self.doctors.is_empty() {
            let available: BTreeSet<String> = self
                .available_doctors()
                .into_iter()
                .map(|doctor| doctor.id)
                .collect();
            self.filter
                .selected_doctors
                .retain(|id| available.contains(id));
        }
        self.page.reset();
        self.sync_page();
    }

    pub fn select_doctors(&mut self, doctors: BTreeSet<String>) {
        self.filter.selected_doctors = doctors;
        self.page.reset();
        self.sync_page();
    }

    /// Back to the default window ending `today`, with no selections.
    pub fn reset_filters(&mut self, today: NaiveDate) {
        self.filter = FilterState::defaults(today, self.window_days);
        self.page.reset();
        self.error = None;
    }

    /// Doctor options for the current department selection.
    pub fn available_doctors(&self) -> Vec<Doctor> {
        doctors_in_departments(&self.doctors, &self.filter.selected_departments)
    }

    pub fn set_trend_mode(&mut self, mode: TrendMode) {
        self.trend_mode = mode;
    }

    pub fn toggle_trend_mode(&mut self) {
        self.trend_mode = self.trend_mode.toggled();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortState<DetailSortKey> {
        self.sort
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn trend_mode(&self) -> TrendMode {
        self.trend_mode
    }

    pub fn server_date(&self) -> Option<NaiveDate> {
        self.server_date
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn summary(&self) -> Option<&SummaryViewModel> {
        self.summary.as_ref()
    }

    pub fn details(&self) -> &DetailPage {
        &self.details
    }

    pub fn timeseries(&self) -> &[TimeseriesRow] {
        &self.timeseries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn sync_page(&mut self) {
        let total = self.processed_rows().len();
        self.page.set_total(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AnalyticsModule;
    use crate::models::InitData;
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl AnalyticsBackend for Offline {
        fn module(&self) -> AnalyticsModule {
            AnalyticsModule::Outpatient
        }
        async fn init(&self) -> Result<InitData> {
            Err(AnalyticsError::Network("refused".into()))
        }
        async fn summary(&self, _: &AnalyticsQuery) -> Result<SummaryViewModel> {
            Err(AnalyticsError::Network("refused".into()))
        }
        async fn details(&self, _: &AnalyticsQuery) -> Result<DetailPage> {
            Err(AnalyticsError::Network("refused".into()))
        }
        async fn timeseries(&self, _: &AnalyticsQuery) -> Result<Vec<TimeseriesRow>> {
            Err(AnalyticsError::Network("refused".into()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 14).unwrap()
    }

    #[test]
    fn test_inverted_window_is_rejected_before_sending() {
        let mut controller = PageController::new(Offline, 20, 0, today());
        let later = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        assert!(controller.set_date_range(later, today()).is_err());
        assert!(controller.error().is_some());

        controller.filter.start_date = later;
        assert!(matches!(
            controller.begin_query(),
            Err(AnalyticsError::InvalidQuery(_))
        ));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_tickets_increase() {
        let mut controller = PageController::new(Offline, 20, 0, today());
        let first = controller.begin_query().unwrap();
        let second = controller.begin_query().unwrap();
        assert!(second.id > first.id);
        assert!(!controller.is_current(first.id));
        assert!(controller.is_current(second.id));
    }

    #[test]
    fn test_sort_toggle_resets_direction_and_page() {
        let mut controller = PageController::new(Offline, 20, 0, today());
        controller.page.total_count = 100;
        controller.page.page_number = 3;

        controller.toggle_sort(DetailSortKey::Date);
        assert_eq!(controller.sort().direction, SortDirection::Descending);
        assert_eq!(controller.page().page_number, 1);

        controller.toggle_sort(DetailSortKey::Revenue);
        assert_eq!(controller.sort().key, DetailSortKey::Revenue);
        assert_eq!(controller.sort().direction, SortDirection::Ascending);
    }

    #[tokio::test]
    async fn test_offline_backend_leaves_page_usable() {
        let mut controller = PageController::new(Offline, 20, 0, today());
        assert!(controller.load_init().await.is_err());
        assert!(controller.submit().await.is_ok());

        assert_eq!(
            controller.error(),
            Some("network error, backend may be unreachable")
        );
        assert!(controller.summary().is_none());
        assert!(controller.view().is_empty());
        assert!(!controller.is_loading());

        controller.dismiss_error();
        assert!(controller.error().is_none());
    }
}
