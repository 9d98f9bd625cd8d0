//! Tabular result processor
//!
//! Composes the generic building blocks into the pipeline every detail table runs:
//!
//! 1. **Filter** - [`crate::filter::filter_by_ids`] on the row's selection id
//! 2. **Sort** - [`crate::sort::sort_rows`] on the active column
//! 3. **Paginate** - [`crate::paginate::paginate`] for the visible window
//!
//! Row types plug in by implementing [`TableRow`], which supplies the field accessors.
//! The pipeline itself knows nothing about revenue, doctors or departments.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::filter::filter_by_ids;
use crate::models::DetailRow;
use crate::paginate::{paginate, PageState};
use crate::sort::{sort_rows, DetailSortKey, SortState, SortValue};

/// Field accessors the pipeline needs from a row type.
pub trait TableRow: Clone {
    type Key: Copy + PartialEq;

    /// Id matched against the active selection.
    fn selection_id(&self) -> Option<&str>;

    fn sort_value(&self, key: Self::Key) -> SortValue<'_>;
}

impl TableRow for DetailRow {
    type Key = DetailSortKey;

    fn selection_id(&self) -> Option<&str> {
        self.doctor_id.as_deref()
    }

    fn sort_value(&self, key: DetailSortKey) -> SortValue<'_> {
        key.value(self)
    }
}

/// One rendered page of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView<T> {
    pub rows: Vec<T>,
    pub page: PageState,
}

impl<T> TableView<T> {
    /// No rows survived filtering; the "no data" placeholder should be shown.
    pub fn is_empty(&self) -> bool {
        self.page.total_count == 0
    }

    pub fn page_count(&self) -> usize {
        self.page.page_count()
    }
}

/// Filter and sort, without paginating.
pub fn filter_and_sort<T: TableRow>(
    rows: &[T],
    selected: &BTreeSet<String>,
    sort: SortState<T::Key>,
) -> Vec<T> {
    let filtered = filter_by_ids(rows, selected, T::selection_id);
    sort_rows(&filtered, sort.direction, |row| row.sort_value(sort.key))
}

/// Run the full pipeline. The page number in `page` is clamped to the filtered row count.
pub fn process<T: TableRow>(
    rows: &[T],
    selected: &BTreeSet<String>,
    sort: SortState<T::Key>,
    mut page: PageState,
) -> TableView<T> {
    let processed = filter_and_sort(rows, selected, sort);
    page.set_total(processed.len());
    let visible = paginate(&processed, page.page_number, page.page_size).to_vec();

    TableView {
        rows: visible,
        page,
    }
}
