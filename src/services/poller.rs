// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Status polling for long-running sync jobs.
//!
//! A poll loop issues one status request per interval while the job is
//! active. It stops on the first terminal status, on teardown, when the
//! backend rejects the request outright, or when the status body cannot be
//! decoded. Each result replaces the previously published snapshot. A failed
//! poll keeps the last known status and only sets `last_error`.
//!
//! A cancel request does not stop the loop: cancellation takes effect
//! server-side and is observed like any other terminal status.

use crate::error::{AppError, Result};
use crate::models::{BackfillStatus, SyncErrorEntry, SyncProgress, SyncState};
use crate::services::backfill;
use crate::services::gateway::HealthDataGateway;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

// ─── Classification ──────────────────────────────────────────

/// What the sync card shows for one [`SyncProgress`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SyncDisplay {
    /// Backend is backing off a provider rate limit
    RateLimited,
    Syncing {
        data_type: Option<String>,
        current_day: u32,
        target_days: u32,
        type_index: u32,
        total_types: u32,
        percent: f64,
    },
    Completed,
    Failed {
        last_error: Option<SyncErrorEntry>,
    },
    /// Any other terminal marker, e.g. after a cancel
    Stopped,
}

pub fn classify(progress: &SyncProgress) -> SyncDisplay {
    match progress.status {
        SyncState::Waiting => SyncDisplay::RateLimited,
        SyncState::Syncing => SyncDisplay::Syncing {
            data_type: progress.current_data_type.clone(),
            current_day: progress.current_day,
            target_days: progress.target_days,
            type_index: progress.current_data_type_index,
            total_types: progress.total_types,
            percent: progress.percent(),
        },
        SyncState::Completed => SyncDisplay::Completed,
        SyncState::Failed => SyncDisplay::Failed {
            last_error: progress.last_error().cloned(),
        },
        SyncState::Cancelled | SyncState::Other => SyncDisplay::Stopped,
    }
}

/// Cancel is offered only while the sync is active.
pub fn can_cancel_sync(progress: &SyncProgress) -> bool {
    progress.status.is_active()
}

/// A status resource that can be polled.
pub trait PolledStatus: Clone + Send + Sync + 'static {
    /// Polling continues exactly while this holds.
    fn is_active(&self) -> bool;
}

impl PolledStatus for SyncProgress {
    fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

impl PolledStatus for BackfillStatus {
    fn is_active(&self) -> bool {
        backfill::phase(self).is_active()
    }
}

// ─── Poll loop ───────────────────────────────────────────────

/// Latest state published by a poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot<S> {
    /// Last successfully fetched status
    pub status: Option<S>,
    /// Error of the most recent poll, cleared by the next success
    pub last_error: Option<String>,
    /// Polls issued so far
    pub polls: u32,
}

impl<S> Default for PollSnapshot<S> {
    fn default() -> Self {
        Self {
            status: None,
            last_error: None,
            polls: 0,
        }
    }
}

/// Why a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The job reached a terminal status
    Terminal,
    /// The backend refused the status request (4xx)
    Rejected(u16),
    /// The status body could not be decoded; polling again would not help
    Undecodable,
    /// The owner tore the loop down
    Teardown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome<S> {
    pub last_status: Option<S>,
    pub reason: StopReason,
}

/// Which job a poll loop watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollJob {
    Backfill,
    SummarySync,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollKey {
    pub user_id: String,
    pub job: PollJob,
}

impl PollKey {
    pub fn new(user_id: impl Into<String>, job: PollJob) -> Self {
        Self {
            user_id: user_id.into(),
            job,
        }
    }
}

impl fmt::Display for PollKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let job = match self.job {
            PollJob::Backfill => "backfill",
            PollJob::SummarySync => "summary sync",
        };
        write!(f, "{} for user {}", job, self.user_id)
    }
}

/// Registry of running poll loops; at most one per job.
#[derive(Clone, Default)]
pub struct ActivePolls {
    inner: Arc<DashMap<PollKey, DateTime<Utc>>>,
}

impl ActivePolls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if a loop for it is already running.
    pub fn try_claim(&self, key: PollKey) -> Option<PollClaim> {
        match self.inner.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Some(PollClaim {
                    key,
                    registry: Arc::clone(&self.inner),
                })
            }
        }
    }

    pub fn is_active(&self, key: &PollKey) -> bool {
        self.inner.contains_key(key)
    }

    /// When the loop for `key` was started, if one is running.
    pub fn started_at(&self, key: &PollKey) -> Option<DateTime<Utc>> {
        self.inner.get(key).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Held for the lifetime of a poll loop; releases the job on drop.
pub struct PollClaim {
    key: PollKey,
    registry: Arc<DashMap<PollKey, DateTime<Utc>>>,
}

impl PollClaim {
    pub fn key(&self) -> &PollKey {
        &self.key
    }
}

impl Drop for PollClaim {
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}

/// Scheduled status poller.
#[derive(Clone)]
pub struct StatusPoller {
    interval: Duration,
    active: ActivePolls,
}

impl StatusPoller {
    pub fn new(interval: Duration, active: ActivePolls) -> Self {
        Self { interval, active }
    }

    pub fn active_polls(&self) -> &ActivePolls {
        &self.active
    }

    /// Poll `fetch` until terminal, rejected, undecodable or torn down.
    ///
    /// Every poll result is published on `updates`. Setting `shutdown` to
    /// `true`, or dropping its sender, tears the loop down.
    pub async fn run<S, F, Fut>(
        &self,
        mut fetch: F,
        updates: &watch::Sender<PollSnapshot<S>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> PollOutcome<S>
    where
        S: PolledStatus,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<S>>,
    {
        let mut snapshot: PollSnapshot<S> = PollSnapshot::default();

        loop {
            if *shutdown.borrow() {
                return teardown(snapshot);
            }

            let result = tokio::select! {
                result = fetch() => result,
                _ = shutdown.changed() => return teardown(snapshot),
            };
            snapshot.polls += 1;

            match result {
                Ok(status) => {
                    let active = status.is_active();
                    snapshot.status = Some(status);
                    snapshot.last_error = None;
                    updates.send_replace(snapshot.clone());
                    if !active {
                        tracing::debug!(polls = snapshot.polls, "Job reached terminal status");
                        return PollOutcome {
                            last_status: snapshot.status,
                            reason: StopReason::Terminal,
                        };
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, polls = snapshot.polls, "Status poll failed");
                    snapshot.last_error = Some(err.to_string());
                    updates.send_replace(snapshot.clone());
                    if let Some(reason) = fatal_stop_reason(&err) {
                        return PollOutcome {
                            last_status: snapshot.status,
                            reason,
                        };
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => return teardown(snapshot),
            }
        }
    }

    /// Watch one user's Garmin backfill.
    pub async fn watch_backfill(
        &self,
        gateway: Arc<dyn HealthDataGateway>,
        user_id: &str,
        updates: &watch::Sender<PollSnapshot<BackfillStatus>>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PollOutcome<BackfillStatus>> {
        let claim = self.claim(PollKey::new(user_id, PollJob::Backfill))?;
        tracing::info!(user_id = %user_id, "Watching backfill");

        let outcome = self
            .run(|| gateway.backfill_status(user_id), updates, shutdown)
            .await;

        tracing::info!(key = %claim.key(), reason = ?outcome.reason, "Backfill watch ended");
        Ok(outcome)
    }

    /// Watch one user's summary sync.
    pub async fn watch_summary_sync(
        &self,
        gateway: Arc<dyn HealthDataGateway>,
        user_id: &str,
        updates: &watch::Sender<PollSnapshot<SyncProgress>>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PollOutcome<SyncProgress>> {
        let claim = self.claim(PollKey::new(user_id, PollJob::SummarySync))?;
        tracing::info!(user_id = %user_id, "Watching summary sync");

        let outcome = self
            .run(|| gateway.summary_sync_status(user_id), updates, shutdown)
            .await;

        tracing::info!(key = %claim.key(), reason = ?outcome.reason, "Summary sync watch ended");
        Ok(outcome)
    }

    fn claim(&self, key: PollKey) -> Result<PollClaim> {
        self.active
            .try_claim(key.clone())
            .ok_or_else(|| AppError::Conflict(key.to_string()))
    }
}

fn teardown<S>(snapshot: PollSnapshot<S>) -> PollOutcome<S> {
    PollOutcome {
        last_status: snapshot.status,
        reason: StopReason::Teardown,
    }
}

/// Errors that end the loop instead of waiting for the next poll.
///
/// 4xx responses end it, except timeouts and rate limits. So does a body
/// that cannot be decoded.
fn fatal_stop_reason(err: &AppError) -> Option<StopReason> {
    match err {
        AppError::Decode(_) => Some(StopReason::Undecodable),
        AppError::Http { status: 408 | 429, .. } => None,
        AppError::Http { status, .. } if err.is_client_error() => {
            Some(StopReason::Rejected(*status))
        }
        _ => None,
    }
}
