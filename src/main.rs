// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wearables-Admin backfill watcher
//!
//! Follows one user's Garmin historical backfill until it finishes, logging
//! every phase change and the data types that need attention.

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wearables_admin::{
    config::Config,
    models::BackfillStatus,
    services::{BackfillView, PollSnapshot, StopReason},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    let user_id = std::env::args()
        .nth(1)
        .context("usage: wearables-admin <user-id>")?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        poll_interval_secs = config.poll_interval.as_secs(),
        "Starting Wearables-Admin backfill watcher"
    );

    let state = Arc::new(AppState::new(config).context("Failed to build gateway")?);

    let (updates_tx, mut updates_rx) = watch::channel(PollSnapshot::<BackfillStatus>::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ctrl-C tears the poll loop down
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping watcher");
            let _ = shutdown_tx.send(true);
        }
    });

    // Log each new snapshot, but only when the phase changes or something failed
    let reporter = tokio::spawn(async move {
        let mut last_phase = None;
        while updates_rx.changed().await.is_ok() {
            let snapshot = updates_rx.borrow_and_update().clone();
            if let Some(err) = &snapshot.last_error {
                tracing::warn!(error = %err, "Status poll failed, showing last known status");
            }
            let Some(status) = snapshot.status else {
                continue;
            };
            let view = BackfillView::from_status(&status);
            if last_phase != Some(view.phase) {
                tracing::info!(
                    phase = view.phase.label(),
                    window = view.current_window,
                    total_windows = view.total_windows,
                    progress = view.progress_fraction,
                    "Backfill phase changed"
                );
                last_phase = Some(view.phase);
            }
            for timed_out in &view.timed_out_types {
                tracing::warn!(
                    data_type = %timed_out.type_name,
                    count = timed_out.timed_out_count,
                    "Data type timed out and can be retried"
                );
            }
            for failed in &view.failed_types {
                tracing::error!(
                    data_type = %failed.type_name,
                    count = failed.failed_count,
                    "Data type failed"
                );
            }
        }
    });

    let outcome = state
        .poller
        .watch_backfill(state.gateway.clone(), &user_id, &updates_tx, shutdown_rx)
        .await?;
    drop(updates_tx);
    let _ = reporter.await;

    match outcome.reason {
        StopReason::Terminal => tracing::info!(user_id = %user_id, "Backfill finished"),
        StopReason::Rejected(status) => {
            anyhow::bail!("Backend rejected the status request (HTTP {})", status)
        }
        StopReason::Undecodable => {
            anyhow::bail!("Backend returned a backfill status this watcher cannot read")
        }
        StopReason::Teardown => tracing::info!(user_id = %user_id, "Watcher stopped"),
    }
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wearables_admin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
