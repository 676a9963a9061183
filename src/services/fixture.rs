// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory [`HealthDataGateway`] backed by scripted fixtures.
//!
//! Status responses are scripted per user as a queue: each poll pops the
//! next entry, and the final entry keeps being returned once the queue is
//! down to one. Failures can be injected ahead of any call.

use crate::error::{AppError, Result};
use crate::models::{
    BackfillStatus, OverallStatus, Page, PageInfo, PaginationCursor, RetryTypeResponse,
    SortOrder, SummaryKind, SummaryQuery, SyncProgress, SyncState, TypeProgress,
};
use crate::services::gateway::HealthDataGateway;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::Mutex;
use validator::Validate;

/// A gateway call, recorded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    FetchSummaries {
        user_id: String,
        kind: SummaryKind,
        cursor: Option<PaginationCursor>,
    },
    BackfillStatus {
        user_id: String,
    },
    RetryBackfillType {
        user_id: String,
        type_name: String,
    },
    CancelBackfill {
        user_id: String,
    },
    StartSummarySync {
        user_id: String,
        days: u32,
    },
    SummarySyncStatus {
        user_id: String,
    },
    CancelSummarySync {
        user_id: String,
    },
}

#[derive(Default)]
struct FixtureState {
    summaries: HashMap<(String, SummaryKind), Vec<serde_json::Value>>,
    backfill: HashMap<String, VecDeque<BackfillStatus>>,
    sync: HashMap<String, VecDeque<SyncProgress>>,
    failures: VecDeque<AppError>,
    calls: Vec<GatewayCall>,
}

/// Scripted gateway for tests and offline demos.
#[derive(Default)]
pub struct FixtureGateway {
    state: Mutex<FixtureState>,
}

impl FixtureGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-loaded with one demo user whose backfill runs to completion.
    pub fn with_demo_data() -> Self {
        let mut state = FixtureState::default();
        let user = "demo-user".to_string();

        let records = (1..=28)
            .map(|day| {
                serde_json::json!({
                    "date": format!("2025-02-{:02}", day),
                    "source": "garmin",
                    "steps": 6000 + day * 150,
                })
            })
            .collect();
        state
            .summaries
            .insert((user.clone(), SummaryKind::Activity), records);

        let total_windows = 4;
        let mut script: VecDeque<BackfillStatus> = (0..=total_windows)
            .map(|window| BackfillStatus {
                overall_status: OverallStatus::InProgress,
                current_window: window,
                total_windows,
                attempt_count: 1,
                max_attempts: 3,
                per_type: BTreeMap::from([(
                    "dailies".to_string(),
                    TypeProgress {
                        succeeded: window,
                        ..TypeProgress::default()
                    },
                )]),
                ..BackfillStatus::default()
            })
            .collect();
        if let Some(last) = script.back_mut() {
            last.overall_status = OverallStatus::Completed;
        }
        state.backfill.insert(user, script);

        Self {
            state: Mutex::new(state),
        }
    }

    /// Set the summary records served for `(user_id, kind)`, oldest first.
    pub async fn set_summaries(
        &self,
        user_id: &str,
        kind: SummaryKind,
        records: Vec<serde_json::Value>,
    ) {
        self.state
            .lock()
            .await
            .summaries
            .insert((user_id.to_string(), kind), records);
    }

    /// Queue backfill statuses to be returned by successive polls.
    pub async fn script_backfill(&self, user_id: &str, statuses: Vec<BackfillStatus>) {
        self.state
            .lock()
            .await
            .backfill
            .insert(user_id.to_string(), statuses.into());
    }

    /// Queue sync progress snapshots to be returned by successive polls.
    pub async fn script_sync(&self, user_id: &str, progress: Vec<SyncProgress>) {
        self.state
            .lock()
            .await
            .sync
            .insert(user_id.to_string(), progress.into());
    }

    /// Make the next call (of any kind) fail with `err`.
    pub async fn fail_next(&self, err: AppError) {
        self.state.lock().await.failures.push_back(err);
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    /// Record the call and pop an injected failure, if any.
    async fn begin(&self, call: GatewayCall) -> Result<tokio::sync::MutexGuard<'_, FixtureState>> {
        let mut state = self.state.lock().await;
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

fn not_found(what: &str, user_id: &str) -> AppError {
    AppError::Http {
        status: 404,
        body: format!("No {} for user {}", what, user_id),
    }
}

/// Pop the next scripted entry, keeping the last one.
fn next_scripted<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

/// Fixture cursors are record offsets; only this module reads them.
fn parse_offset(cursor: &PaginationCursor) -> Result<usize> {
    cursor
        .as_str()
        .strip_prefix("offset:")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| AppError::Http {
            status: 400,
            body: format!("Invalid cursor: {}", cursor),
        })
}

#[async_trait]
impl HealthDataGateway for FixtureGateway {
    async fn fetch_summaries(
        &self,
        user_id: &str,
        kind: SummaryKind,
        query: &SummaryQuery,
        cursor: Option<&PaginationCursor>,
    ) -> Result<Page<serde_json::Value>> {
        query.validate()?;
        let state = self
            .begin(GatewayCall::FetchSummaries {
                user_id: user_id.to_string(),
                kind,
                cursor: cursor.cloned(),
            })
            .await?;

        let mut records = state
            .summaries
            .get(&(user_id.to_string(), kind))
            .cloned()
            .unwrap_or_default();
        if query.sort_order == SortOrder::Desc {
            records.reverse();
        }

        let offset = cursor.map(parse_offset).transpose()?.unwrap_or(0);
        let limit = query.limit as usize;
        let end = (offset + limit).min(records.len());
        let data = records.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let has_more = end < records.len();

        Ok(Page {
            data,
            pagination: PageInfo {
                next_cursor: has_more.then(|| PaginationCursor::new(format!("offset:{}", end))),
                previous_cursor: (offset > 0).then(|| {
                    PaginationCursor::new(format!("offset:{}", offset.saturating_sub(limit)))
                }),
                has_more,
            },
            metadata: serde_json::json!({ "resolution": "daily" }),
        })
    }

    async fn backfill_status(&self, user_id: &str) -> Result<BackfillStatus> {
        let mut state = self
            .begin(GatewayCall::BackfillStatus {
                user_id: user_id.to_string(),
            })
            .await?;
        state
            .backfill
            .get_mut(user_id)
            .and_then(next_scripted)
            .ok_or_else(|| not_found("backfill", user_id))
    }

    async fn retry_backfill_type(
        &self,
        user_id: &str,
        type_name: &str,
    ) -> Result<RetryTypeResponse> {
        let state = self
            .begin(GatewayCall::RetryBackfillType {
                user_id: user_id.to_string(),
                type_name: type_name.to_string(),
            })
            .await?;
        if !state.backfill.contains_key(user_id) {
            return Err(not_found("backfill", user_id));
        }
        Ok(RetryTypeResponse {
            success: true,
            type_name: type_name.to_string(),
            status: "retry_in_progress".to_string(),
        })
    }

    async fn cancel_backfill(&self, user_id: &str) -> Result<()> {
        let _state = self
            .begin(GatewayCall::CancelBackfill {
                user_id: user_id.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn start_summary_sync(&self, user_id: &str, days: u32) -> Result<SyncProgress> {
        let mut state = self
            .begin(GatewayCall::StartSummarySync {
                user_id: user_id.to_string(),
                days,
            })
            .await?;
        let initial = SyncProgress {
            status: SyncState::Syncing,
            progress_percent: 0.0,
            current_data_type_index: 0,
            total_types: 0,
            current_data_type: None,
            current_day: 0,
            target_days: days,
            errors: Vec::new(),
        };
        Ok(state
            .sync
            .entry(user_id.to_string())
            .or_insert_with(|| VecDeque::from([initial.clone()]))
            .front()
            .cloned()
            .unwrap_or(initial))
    }

    async fn summary_sync_status(&self, user_id: &str) -> Result<SyncProgress> {
        let mut state = self
            .begin(GatewayCall::SummarySyncStatus {
                user_id: user_id.to_string(),
            })
            .await?;
        state
            .sync
            .get_mut(user_id)
            .and_then(next_scripted)
            .ok_or_else(|| not_found("sync", user_id))
    }

    async fn cancel_summary_sync(&self, user_id: &str) -> Result<()> {
        let _state = self
            .begin(GatewayCall::CancelSummarySync {
                user_id: user_id.to_string(),
            })
            .await?;
        Ok(())
    }
}
