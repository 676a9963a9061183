// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cursor pagination state for one result set.
//!
//! The controller remembers every cursor it has been handed so that moving
//! back and then forward again reuses the recorded cursor instead of trusting
//! whatever the latest response said. History only grows; it is dropped as a
//! whole by [`CursorPaginationController::reset`] when the query changes.

use crate::models::PaginationCursor;

/// Append-only cursor history plus the active page.
///
/// Page 1 needs no cursor, so `cursors[i]` is the cursor of page `i + 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPaginationController {
    cursors: Vec<PaginationCursor>,
    /// 1-based, always within `1..=cursors.len() + 1`
    page: usize,
}

impl Default for CursorPaginationController {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorPaginationController {
    pub fn new() -> Self {
        Self {
            cursors: Vec::new(),
            page: 1,
        }
    }

    /// Cursor for the active page; `None` means the first page.
    pub fn current_cursor(&self) -> Option<&PaginationCursor> {
        self.cursor_of_page(self.page)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page() > 1
    }

    /// Number of pages whose cursor is known (including page 1).
    pub fn recorded_pages(&self) -> usize {
        self.cursors.len() + 1
    }

    /// Whether the page after the current one has already been visited.
    pub fn has_recorded_next(&self) -> bool {
        self.current_page() < self.recorded_pages()
    }

    /// Cursor the next page would be fetched with.
    ///
    /// A cursor recorded on an earlier visit wins over `candidate`.
    pub fn cursor_for_next<'a>(
        &'a self,
        candidate: Option<&'a PaginationCursor>,
    ) -> Option<&'a PaginationCursor> {
        candidate?;
        if self.has_recorded_next() {
            self.cursor_of_page(self.current_page() + 1)
        } else {
            candidate
        }
    }

    /// Cursor of the previous page; `None` on page 1 or when that page is the first.
    pub fn cursor_for_prev(&self) -> Option<&PaginationCursor> {
        if self.has_prev_page() {
            self.cursor_of_page(self.current_page() - 1)
        } else {
            None
        }
    }

    /// Advance one page.
    ///
    /// `None` means the backend has no further page and is a no-op. The
    /// cursor is only recorded the first time the following page is reached.
    pub fn go_to_next(&mut self, next_cursor: Option<PaginationCursor>) {
        let Some(cursor) = next_cursor else {
            return;
        };
        if !self.has_recorded_next() {
            self.cursors.push(cursor);
        }
        self.page += 1;
    }

    /// Step back one page, keeping all recorded cursors.
    pub fn go_to_prev(&mut self) {
        if self.has_prev_page() {
            self.page -= 1;
        }
    }

    /// Forget all cursors and return to page 1.
    pub fn reset(&mut self) {
        self.cursors.clear();
        self.page = 1;
    }

    fn cursor_of_page(&self, page: usize) -> Option<&PaginationCursor> {
        page.checked_sub(2).and_then(|idx| self.cursors.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(token: &str) -> Option<PaginationCursor> {
        Some(PaginationCursor::new(token))
    }

    fn assert_initial(ctl: &CursorPaginationController) {
        assert_eq!(ctl.current_page(), 1);
        assert_eq!(ctl.current_cursor(), None);
        assert!(!ctl.has_prev_page());
    }

    #[test]
    fn test_initial_state() {
        assert_initial(&CursorPaginationController::new());
        assert_initial(&CursorPaginationController::default());
    }

    #[test]
    fn test_forward_and_back() {
        let mut ctl = CursorPaginationController::new();
        ctl.go_to_next(c("c1"));
        assert_eq!(ctl.current_page(), 2);
        assert_eq!(ctl.current_cursor().map(|c| c.as_str()), Some("c1"));
        assert!(ctl.has_prev_page());

        ctl.go_to_next(c("c2"));
        assert_eq!(ctl.current_page(), 3);

        ctl.go_to_prev();
        assert_eq!(ctl.current_page(), 2);
        assert_eq!(ctl.current_cursor().map(|c| c.as_str()), Some("c1"));

        ctl.go_to_prev();
        assert_initial(&ctl);

        // Already on page 1
        ctl.go_to_prev();
        assert_initial(&ctl);
        assert_eq!(ctl.recorded_pages(), 3);
    }

    #[test]
    fn test_revisit_keeps_recorded_cursor() {
        let mut ctl = CursorPaginationController::new();
        ctl.go_to_next(c("c1"));
        ctl.go_to_next(c("c2"));
        ctl.go_to_prev();

        assert_eq!(
            ctl.cursor_for_next(c("divergent").as_ref()).map(|c| c.as_str()),
            Some("c2")
        );
        ctl.go_to_next(c("divergent"));

        assert_eq!(ctl.current_page(), 3);
        assert_eq!(ctl.current_cursor().map(|c| c.as_str()), Some("c2"));
        assert_eq!(ctl.recorded_pages(), 3);
    }

    #[test]
    fn test_repeated_response_does_not_duplicate_history() {
        let mut ctl = CursorPaginationController::new();
        ctl.go_to_next(c("c1"));
        ctl.go_to_prev();
        ctl.go_to_next(c("c1"));
        ctl.go_to_prev();
        ctl.go_to_next(c("c1"));
        assert_eq!(ctl.recorded_pages(), 2);
        assert_eq!(ctl.current_page(), 2);
    }

    #[test]
    fn test_next_none_is_noop() {
        let mut ctl = CursorPaginationController::new();
        ctl.go_to_next(None);
        assert_initial(&ctl);

        ctl.go_to_next(c("c1"));
        let before = ctl.clone();
        ctl.go_to_next(None);
        assert_eq!(ctl, before);
        assert_eq!(ctl.cursor_for_next(None), None);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut ctl = CursorPaginationController::new();
        ctl.go_to_next(c("c1"));
        ctl.go_to_next(c("c2"));
        ctl.reset();
        assert_initial(&ctl);
        assert_eq!(ctl.recorded_pages(), 1);

        // A new query records fresh cursors
        ctl.go_to_next(c("other"));
        assert_eq!(ctl.current_cursor().map(|c| c.as_str()), Some("other"));
    }

    #[test]
    fn test_cursor_for_prev() {
        let mut ctl = CursorPaginationController::new();
        assert_eq!(ctl.cursor_for_prev(), None);
        ctl.go_to_next(c("c1"));
        // Previous page is page 1, which has no cursor
        assert_eq!(ctl.cursor_for_prev(), None);
        ctl.go_to_next(c("c2"));
        assert_eq!(ctl.cursor_for_prev().map(|c| c.as_str()), Some("c1"));
    }
}
