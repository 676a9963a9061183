// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backfill state interpretation.
//!
//! Reduces a polled [`BackfillStatus`] into the facts the dashboard acts on:
//! which phase the job is in, how far it got, which data types can be
//! retried and which failed for good. Everything here is a pure function of
//! one snapshot; the job itself only changes server-side.
//!
//! Retry policy: only timed-out data types are retryable. A type that has
//! any failed window is reported as failed and is never offered a retry,
//! even if some of its windows also timed out.

use crate::models::{BackfillStatus, OverallStatus};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Phase of a backfill job as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BackfillPhase {
    Idle,
    Running,
    /// A single previously timed-out type/window is being retried
    Retrying,
    Cancelled,
    /// Terminal; needs a disconnect and reconnect, not a retry
    PermanentlyFailed,
    Completed,
    /// Backend reported a status this client does not recognize
    Unknown,
}

impl BackfillPhase {
    /// Job is making progress and should keep being polled.
    pub fn is_active(self) -> bool {
        matches!(self, BackfillPhase::Running | BackfillPhase::Retrying)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BackfillPhase::Completed | BackfillPhase::Cancelled | BackfillPhase::PermanentlyFailed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            BackfillPhase::Idle => "Not started",
            BackfillPhase::Running => "Syncing history",
            BackfillPhase::Retrying => "Retrying",
            BackfillPhase::Cancelled => "Cancelled",
            BackfillPhase::PermanentlyFailed => "Failed - reconnect required",
            BackfillPhase::Completed => "Completed",
            BackfillPhase::Unknown => "Unknown status",
        }
    }
}

/// A data type with timed-out windows (retryable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TimedOutType {
    pub type_name: String,
    pub timed_out_count: u32,
}

/// A data type with failed windows (informational only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FailedType {
    pub type_name: String,
    pub failed_count: u32,
}

pub fn phase(status: &BackfillStatus) -> BackfillPhase {
    // max_attempts == 0 means the backend did not report a limit
    let attempts_exhausted =
        status.max_attempts > 0 && status.attempt_count >= status.max_attempts;
    if attempts_exhausted || status.permanently_failed {
        return BackfillPhase::PermanentlyFailed;
    }

    match status.overall_status {
        OverallStatus::NotStarted => BackfillPhase::Idle,
        OverallStatus::InProgress => BackfillPhase::Running,
        OverallStatus::RetryInProgress => BackfillPhase::Retrying,
        OverallStatus::Completed => BackfillPhase::Completed,
        OverallStatus::Cancelled => BackfillPhase::Cancelled,
        OverallStatus::PermanentlyFailed => BackfillPhase::PermanentlyFailed,
        OverallStatus::Unknown => BackfillPhase::Unknown,
    }
}

/// Completed share of windows, in `[0, 1]`.
pub fn progress_fraction(status: &BackfillStatus) -> f64 {
    if status.total_windows == 0 {
        return 0.0;
    }
    let fraction = f64::from(status.current_window) / f64::from(status.total_windows);
    fraction.clamp(0.0, 1.0)
}

/// Timed-out types, hidden while the job is still running.
pub fn timed_out_types(status: &BackfillStatus) -> Vec<TimedOutType> {
    if phase(status).is_active() {
        return Vec::new();
    }
    status
        .per_type
        .iter()
        .filter(|(_, progress)| progress.timed_out > 0 && progress.failed == 0)
        .map(|(name, progress)| TimedOutType {
            type_name: name.clone(),
            timed_out_count: progress.timed_out,
        })
        .collect()
}

/// Failed types, hidden while the job is still running.
pub fn failed_types(status: &BackfillStatus) -> Vec<FailedType> {
    if phase(status).is_active() {
        return Vec::new();
    }
    status
        .per_type
        .iter()
        .filter(|(_, progress)| progress.failed > 0)
        .map(|(name, progress)| FailedType {
            type_name: name.clone(),
            failed_count: progress.failed,
        })
        .collect()
}

/// Names of the data types the "retry one type" action may target.
pub fn retryable_types(status: &BackfillStatus) -> Vec<String> {
    timed_out_types(status)
        .into_iter()
        .map(|t| t.type_name)
        .collect()
}

pub fn can_retry(status: &BackfillStatus, type_name: &str) -> bool {
    timed_out_types(status)
        .iter()
        .any(|t| t.type_name == type_name)
}

/// Cancel is only offered while the job is making progress.
pub fn can_cancel(status: &BackfillStatus) -> bool {
    phase(status).is_active()
}

pub fn needs_reconnect(status: &BackfillStatus) -> bool {
    phase(status) == BackfillPhase::PermanentlyFailed
}

/// Type and window being retried, while in the retrying phase.
pub fn retry_target(status: &BackfillStatus) -> Option<(&str, Option<u32>)> {
    if phase(status) != BackfillPhase::Retrying {
        return None;
    }
    status
        .retry_type
        .as_deref()
        .map(|type_name| (type_name, status.retry_window))
}

/// Everything the connection card renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackfillView {
    pub phase: BackfillPhase,
    pub progress_fraction: f64,
    pub current_window: u32,
    pub total_windows: u32,
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub retry_type: Option<String>,
    pub retry_window: Option<u32>,
    pub timed_out_types: Vec<TimedOutType>,
    pub failed_types: Vec<FailedType>,
    pub can_cancel: bool,
    pub needs_reconnect: bool,
}

impl BackfillView {
    pub fn from_status(status: &BackfillStatus) -> Self {
        let phase = phase(status);
        let (retry_type, retry_window) = match retry_target(status) {
            Some((type_name, window)) => (Some(type_name.to_string()), window),
            None => (None, None),
        };

        Self {
            phase,
            progress_fraction: progress_fraction(status),
            current_window: status.current_window,
            total_windows: status.total_windows,
            attempt_count: status.attempt_count,
            max_attempts: status.max_attempts,
            retry_type,
            retry_window,
            timed_out_types: timed_out_types(status),
            failed_types: failed_types(status),
            can_cancel: phase.is_active(),
            needs_reconnect: phase == BackfillPhase::PermanentlyFailed,
        }
    }
}
