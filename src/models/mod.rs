// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wire types shared with the REST backend.

pub mod backfill;
pub mod pagination;
pub mod summary;
pub mod sync;

pub use backfill::{BackfillStatus, OverallStatus, RetryTypeResponse, TypeProgress};
pub use pagination::{Page, PageInfo, PaginationCursor};
pub use summary::{
    ActivitySummary, BodySummary, RecoverySummary, SleepSummary, SortOrder, SummaryKind,
    SummaryQuery,
};
pub use sync::{SyncErrorEntry, SyncProgress, SyncState};
