//! Client-side pagination over a fully fetched result set.

use serde::Serialize;

/// Number of pages for `total` rows; never less than one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// The 1-based `page` window of `rows`.
///
/// Out-of-range pages (including page 0) yield an empty slice rather than an error;
/// keeping the page number in range is the caller's job.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// Page position for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    #[serde(rename = "pageNumber")]
    pub page_number: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total_count, self.page_size)
    }

    /// Record a new row count, pulling the current page back into range.
    pub fn set_total(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.page_number = self.clamp(self.page_number);
    }

    /// Jump to `page`, clamped to `[1, page_count]`.
    pub fn go_to(&mut self, page: usize) {
        self.page_number = self.clamp(page);
    }

    pub fn next(&mut self) {
        self.go_to(self.page_number.saturating_add(1));
    }

    pub fn previous(&mut self) {
        self.go_to(self.page_number.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.page_number = 1;
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.page_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 20), 1);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(45, 20), 3);
        assert_eq!(page_count(10, 0), 1);
    }

    #[test]
    fn test_paginate_windows() {
        let rows: Vec<u32> = (1..=45).collect();
        assert_eq!(paginate(&rows, 1, 20), &rows[0..20]);
        assert_eq!(paginate(&rows, 3, 20), &rows[40..45]);
        assert!(paginate(&rows, 4, 20).is_empty());
        assert!(paginate(&rows, 0, 20).is_empty());
        assert!(paginate(&rows, usize::MAX, 20).is_empty());
    }

    #[test]
    fn test_page_state_navigation() {
        let mut state = PageState::new(20);
        state.set_total(45);
        assert_eq!(state.page_count(), 3);
        assert!(!state.has_previous());

        state.next();
        state.next();
        state.next();
        assert_eq!(state.page_number, 3);
        assert!(!state.has_next());

        state.go_to(0);
        assert_eq!(state.page_number, 1);
        state.previous();
        assert_eq!(state.page_number, 1);
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let mut state = PageState::new(20);
        state.set_total(100);
        state.go_to(5);
        state.set_total(30);
        assert_eq!(state.page_number, 2);
        state.set_total(0);
        assert_eq!(state.page_number, 1);
    }
}
