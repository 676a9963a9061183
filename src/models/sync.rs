// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary sync progress (the simpler, day-by-day REST sync).

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Sync job state.
///
/// `Waiting` means the backend is backing off a provider rate limit and will
/// return to `Syncing` on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SyncState {
    Syncing,
    Waiting,
    Completed,
    Failed,
    Cancelled,
    /// Any other provider-specific terminal marker.
    #[serde(other)]
    Other,
}

impl SyncState {
    /// Polling continues exactly while this holds.
    pub fn is_active(self) -> bool {
        matches!(self, SyncState::Syncing | SyncState::Waiting)
    }
}

/// A per data type error reported by the sync job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncErrorEntry {
    pub data_type: String,
    pub error: String,
}

/// Progress of a summary sync job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncProgress {
    pub status: SyncState,
    #[serde(default)]
    pub progress_percent: f64,
    #[serde(default)]
    pub current_data_type_index: u32,
    #[serde(default)]
    pub total_types: u32,
    #[serde(default)]
    pub current_data_type: Option<String>,
    #[serde(default)]
    pub current_day: u32,
    #[serde(default)]
    pub target_days: u32,
    /// Errors in the order they happened
    #[serde(default)]
    pub errors: Vec<SyncErrorEntry>,
}

impl SyncProgress {
    /// Progress clamped to `0..=100`; NaN reads as 0.
    pub fn percent(&self) -> f64 {
        if self.progress_percent.is_nan() {
            0.0
        } else {
            self.progress_percent.clamp(0.0, 100.0)
        }
    }

    /// Most recent error, if any.
    pub fn last_error(&self) -> Option<&SyncErrorEntry> {
        self.errors.last()
    }
}
