// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily summary records and the query that pages through them.

use crate::date_range::DateInterval;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Largest page the backend will serve.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Which summary endpoint to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SummaryKind {
    Activity,
    Sleep,
    Body,
    Recovery,
}

impl SummaryKind {
    /// Path segment under `/summaries/`.
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryKind::Activity => "activity",
            SummaryKind::Sleep => "sleep",
            SummaryKind::Body => "body",
            SummaryKind::Recovery => "recovery",
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters identifying one summary result set.
///
/// Two queries that compare equal address the same ordered stream, so
/// cursors recorded for one are valid for the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Validate)]
pub struct SummaryQuery {
    pub range: DateInterval,
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    pub sort_order: SortOrder,
}

impl SummaryQuery {
    pub fn new(range: DateInterval, limit: u32) -> Self {
        Self {
            range,
            limit,
            sort_order: SortOrder::default(),
        }
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Query string pairs, excluding the cursor.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = self.range.query_params().into();
        params.push(("limit", self.limit.to_string()));
        params.push(("sort_order", self.sort_order.as_str().to_string()));
        params
    }
}

/// Daily activity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub active_calories_kcal: Option<f64>,
    #[serde(default)]
    pub active_minutes: Option<u32>,
    #[serde(default)]
    pub heart_rate_avg_bpm: Option<f64>,
    #[serde(default)]
    pub heart_rate_max_bpm: Option<f64>,
}

/// Nightly sleep summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SleepSummary {
    pub date: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub deep_minutes: Option<u32>,
    #[serde(default)]
    pub rem_minutes: Option<u32>,
    #[serde(default)]
    pub light_minutes: Option<u32>,
    #[serde(default)]
    pub awake_minutes: Option<u32>,
    #[serde(default)]
    pub efficiency_percent: Option<f64>,
}

/// Body composition summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BodySummary {
    pub date: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub body_fat_percent: Option<f64>,
    #[serde(default)]
    pub resting_heart_rate_bpm: Option<f64>,
}

/// Recovery summary (HRV, readiness).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecoverySummary {
    pub date: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub hrv_rmssd_ms: Option<f64>,
    #[serde(default)]
    pub recovery_score: Option<f64>,
    #[serde(default)]
    pub resting_heart_rate_bpm: Option<f64>,
}
