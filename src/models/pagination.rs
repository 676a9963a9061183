// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cursor-paginated response envelope.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Opaque pagination token issued by the backend.
///
/// The client passes it back verbatim and never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PaginationCursor(String);

impl PaginationCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaginationCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaginationCursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Pagination block of a page response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PageInfo {
    #[serde(default)]
    pub next_cursor: Option<PaginationCursor>,
    #[serde(default)]
    pub previous_cursor: Option<PaginationCursor>,
    #[serde(default)]
    pub has_more: bool,
}

/// One page of a time-series result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: PageInfo,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl<T> Page<T> {
    /// Cursor for the following page, if the backend reports one.
    ///
    /// A cursor is only honoured together with `has_more`; some backends
    /// echo a cursor on the last page.
    pub fn next_cursor(&self) -> Option<&PaginationCursor> {
        if self.pagination.has_more {
            self.pagination.next_cursor.as_ref()
        } else {
            None
        }
    }
}

impl Page<serde_json::Value> {
    /// Decode the raw records into a typed summary.
    pub fn decode_records<T: DeserializeOwned>(&self) -> Result<Page<T>> {
        let data = self
            .data
            .iter()
            .map(|record| serde_json::from_value(record.clone()))
            .collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(Page {
            data,
            pagination: self.pagination.clone(),
            metadata: self.metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_envelope() {
        let json = r#"{
            "data": [{"date": "2025-01-01"}],
            "pagination": {"next_cursor": "abc==", "previous_cursor": null, "has_more": true},
            "metadata": {"resolution": "daily"}
        }"#;
        let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.next_cursor(), Some(&PaginationCursor::new("abc==")));
        assert_eq!(page.metadata["resolution"], "daily");
    }

    #[test]
    fn test_decode_records() {
        let json = r#"{"data": [{"date": "2025-01-02", "steps": 8123}], "pagination": {}}"#;
        let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
        let typed = page
            .decode_records::<crate::models::ActivitySummary>()
            .unwrap();
        assert_eq!(typed.data[0].steps, Some(8123));

        let bad = r#"{"data": [{"steps": 1}]}"#;
        let page: Page<serde_json::Value> = serde_json::from_str(bad).unwrap();
        assert!(page.decode_records::<crate::models::ActivitySummary>().is_err());
    }

    #[test]
    fn test_next_cursor_ignored_without_has_more() {
        let json = r#"{"data": [], "pagination": {"next_cursor": "stale", "has_more": false}}"#;
        let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_cursor(), None);
    }
}
