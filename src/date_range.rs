// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lookback window resolution.
//!
//! Every range is half-open, `[start, end)`, with both ends on UTC day
//! boundaries. The end is always midnight UTC of the day *after* today so
//! that samples recorded today are included even when the caller's clock or
//! timezone disagrees with the backend's.

use crate::error::{AppError, Result};
use crate::time_utils::{format_utc_rfc3339, utc_midnight};
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lower bound used for "all time" queries: 2000-01-01.
pub fn all_time_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Lookback selector offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LookbackWindow {
    Week,
    Month,
    Quarter,
    Year,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 4] = [
        LookbackWindow::Week,
        LookbackWindow::Month,
        LookbackWindow::Quarter,
        LookbackWindow::Year,
    ];

    pub fn days(self) -> u32 {
        match self {
            LookbackWindow::Week => 7,
            LookbackWindow::Month => 30,
            LookbackWindow::Quarter => 90,
            LookbackWindow::Year => 365,
        }
    }
}

impl TryFrom<u32> for LookbackWindow {
    type Error = AppError;

    fn try_from(days: u32) -> Result<Self> {
        match days {
            7 => Ok(LookbackWindow::Week),
            30 => Ok(LookbackWindow::Month),
            90 => Ok(LookbackWindow::Quarter),
            365 => Ok(LookbackWindow::Year),
            other => Err(AppError::validation(format!(
                "lookback window must be one of 7, 30, 90 or 365 days, got {}",
                other
            ))),
        }
    }
}

impl From<LookbackWindow> for u32 {
    fn from(window: LookbackWindow) -> Self {
        window.days()
    }
}

/// What the user picked in the range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateRangeSelection {
    Window(LookbackWindow),
    AllTime,
}

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    /// Whether `instant` falls inside the interval (end excluded).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// `(start_date, end_date)` query parameters in ISO-8601 UTC.
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", format_utc_rfc3339(self.start)),
            ("end_date", format_utc_rfc3339(self.end)),
        ]
    }
}

/// Midnight UTC of the day after `today`.
fn exclusive_end(today: NaiveDate) -> DateTime<Utc> {
    // Only overflows at the end of chrono's representable range.
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    utc_midnight(tomorrow)
}

fn window_from_date(window: LookbackWindow, today: NaiveDate) -> DateInterval {
    let first_day = today
        .checked_sub_days(Days::new(u64::from(window.days())))
        .unwrap_or(NaiveDate::MIN);
    DateInterval {
        start: utc_midnight(first_day),
        end: exclusive_end(today),
    }
}

/// Resolve a lookback window against `now`, using UTC calendar days.
pub fn resolve_window(window: LookbackWindow, now: DateTime<Utc>) -> DateInterval {
    window_from_date(window, now.date_naive())
}

/// Resolve a lookback window using the caller's local calendar date.
///
/// The local date decides which day is "today"; the resulting day boundaries
/// are then expressed as UTC midnights.
pub fn resolve_window_local<Tz: TimeZone>(
    window: LookbackWindow,
    now: DateTime<Tz>,
) -> DateInterval {
    window_from_date(window, now.date_naive())
}

/// Resolve an "all time" request: from the fixed floor up to tomorrow.
pub fn resolve_all_time(now: DateTime<Utc>) -> DateInterval {
    DateInterval {
        start: utc_midnight(all_time_floor()),
        end: exclusive_end(now.date_naive()),
    }
}

pub fn resolve(selection: DateRangeSelection, now: DateTime<Utc>) -> DateInterval {
    match selection {
        DateRangeSelection::Window(window) => resolve_window(window, now),
        DateRangeSelection::AllTime => resolve_all_time(now),
    }
}
