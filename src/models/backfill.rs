// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin historical backfill status, as reported by the backend.
//!
//! The backend walks each data type through a series of time windows.
//! A window that times out is retried up to `max_attempts` times; after that
//! the job is permanently failed and needs a disconnect/reconnect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Raw job status string from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum OverallStatus {
    #[default]
    NotStarted,
    InProgress,
    RetryInProgress,
    Completed,
    Cancelled,
    PermanentlyFailed,
    /// Any status this client does not know yet
    #[serde(other)]
    Unknown,
}

/// Window outcome counters for a single data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TypeProgress {
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub timed_out: u32,
}

/// Backfill status for one user's Garmin connection.
///
/// Polled from `GET /providers/garmin/users/{user_id}/backfill/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackfillStatus {
    #[serde(default)]
    pub overall_status: OverallStatus,
    /// 0-based index of the window being fetched (equals `total_windows` when done)
    #[serde(default)]
    pub current_window: u32,
    #[serde(default)]
    pub total_windows: u32,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default)]
    pub max_attempts: u32,
    /// Data type currently being retried, if any
    #[serde(default)]
    pub retry_type: Option<String>,
    /// Window currently being retried, if any
    #[serde(default)]
    pub retry_window: Option<u32>,
    /// Backend's own terminal-failure flag
    #[serde(default)]
    pub permanently_failed: bool,
    /// Per data type counters, keyed by type name ("sleeps", "dailies", ...)
    #[serde(default)]
    pub per_type: BTreeMap<String, TypeProgress>,
}

/// Response to `POST .../backfill/{type_name}/retry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RetryTypeResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    pub status: String,
}
