// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page-by-page navigation over one summary query.
//!
//! Pagination state only moves after the page fetch for the new position
//! succeeded, so a failed request leaves the view exactly where it was.

use crate::date_range::{self, DateRangeSelection};
use crate::error::Result;
use crate::models::{Page, PaginationCursor, SummaryKind, SummaryQuery};
use crate::pagination::CursorPaginationController;
use crate::services::gateway::HealthDataGateway;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Drives one summary result list.
pub struct SummaryPager {
    gateway: Arc<dyn HealthDataGateway>,
    user_id: String,
    kind: SummaryKind,
    query: SummaryQuery,
    pagination: CursorPaginationController,
    last_page: Option<Page<serde_json::Value>>,
}

impl SummaryPager {
    pub fn new(
        gateway: Arc<dyn HealthDataGateway>,
        user_id: impl Into<String>,
        kind: SummaryKind,
        query: SummaryQuery,
    ) -> Self {
        Self {
            gateway,
            user_id: user_id.into(),
            kind,
            query,
            pagination: CursorPaginationController::new(),
            last_page: None,
        }
    }

    pub fn query(&self) -> &SummaryQuery {
        &self.query
    }

    pub fn pagination(&self) -> &CursorPaginationController {
        &self.pagination
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn last_page(&self) -> Option<&Page<serde_json::Value>> {
        self.last_page.as_ref()
    }

    pub fn has_next_page(&self) -> bool {
        self.last_page
            .as_ref()
            .and_then(|page| page.next_cursor())
            .is_some()
    }

    pub fn has_prev_page(&self) -> bool {
        self.pagination.has_prev_page()
    }

    /// Replace the query. Returns `true` if pagination was reset.
    ///
    /// Setting an identical query keeps the current position.
    pub fn set_query(&mut self, query: SummaryQuery) -> bool {
        if query == self.query {
            return false;
        }
        tracing::debug!(
            user_id = %self.user_id,
            kind = %self.kind,
            "Summary query changed, resetting pagination"
        );
        self.query = query;
        self.pagination.reset();
        self.last_page = None;
        true
    }

    /// Switch to another lookback window, keeping limit and sort order.
    pub fn set_range(&mut self, selection: DateRangeSelection, now: DateTime<Utc>) -> bool {
        let query = SummaryQuery {
            range: date_range::resolve(selection, now),
            ..self.query.clone()
        };
        self.set_query(query)
    }

    /// Fetch the page at the current position.
    pub async fn fetch_current(&mut self) -> Result<&Page<serde_json::Value>> {
        let cursor = self.pagination.current_cursor().cloned();
        let page = self.fetch(cursor.as_ref()).await?;
        Ok(&*self.last_page.insert(page))
    }

    /// Move to the next page. `Ok(None)` when there is none.
    pub async fn next_page(&mut self) -> Result<Option<&Page<serde_json::Value>>> {
        let Some(candidate) = self
            .last_page
            .as_ref()
            .and_then(|page| page.next_cursor())
            .cloned()
        else {
            return Ok(None);
        };

        let cursor = self.pagination.cursor_for_next(Some(&candidate)).cloned();
        let page = self.fetch(cursor.as_ref()).await?;

        self.pagination.go_to_next(Some(candidate));
        tracing::debug!(
            page = self.pagination.current_page(),
            kind = %self.kind,
            "Advanced to next page"
        );
        Ok(Some(&*self.last_page.insert(page)))
    }

    /// Move to the previous page. `Ok(None)` on the first page.
    pub async fn prev_page(&mut self) -> Result<Option<&Page<serde_json::Value>>> {
        if !self.pagination.has_prev_page() {
            return Ok(None);
        }

        let cursor = self.pagination.cursor_for_prev().cloned();
        let page = self.fetch(cursor.as_ref()).await?;

        self.pagination.go_to_prev();
        tracing::debug!(
            page = self.pagination.current_page(),
            kind = %self.kind,
            "Went back one page"
        );
        Ok(Some(&*self.last_page.insert(page)))
    }

    async fn fetch(&self, cursor: Option<&PaginationCursor>) -> Result<Page<serde_json::Value>> {
        self.gateway
            .fetch_summaries(&self.user_id, self.kind, &self.query, cursor)
            .await
    }
}
