// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wearables_admin::config::{Config, GatewayMode};
use wearables_admin::date_range::{resolve_window, LookbackWindow};
use wearables_admin::models::{
    BackfillStatus, OverallStatus, SummaryQuery, SyncProgress, SyncState, TypeProgress,
};
use wearables_admin::services::{FixtureGateway, HttpGateway};

/// Config pointing at a mock backend, with near-zero retry backoff.
#[allow(dead_code)]
pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        api_key: Some("test_api_key".to_string()),
        session_token: None,
        request_timeout: Duration::from_secs(2),
        max_retries: 2,
        retry_backoff: Duration::from_millis(1),
        poll_interval: Duration::from_millis(5),
        page_limit: 50,
        gateway_mode: GatewayMode::Http,
    }
}

#[allow(dead_code)]
pub fn http_gateway(api_url: &str) -> HttpGateway {
    HttpGateway::new(&test_config(api_url)).expect("Failed to build gateway")
}

#[allow(dead_code)]
pub fn fixture_gateway() -> Arc<FixtureGateway> {
    Arc::new(FixtureGateway::new())
}

/// Week window ending 2025-01-10, limit `limit`.
#[allow(dead_code)]
pub fn week_query(limit: u32) -> SummaryQuery {
    let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap();
    SummaryQuery::new(resolve_window(LookbackWindow::Week, now), limit)
}

/// `count` daily records, oldest first.
#[allow(dead_code)]
pub fn daily_records(count: u32) -> Vec<serde_json::Value> {
    (1..=count)
        .map(|day| {
            serde_json::json!({ "date": format!("2025-01-{:02}", day), "steps": day * 1000 })
        })
        .collect()
}

#[allow(dead_code)]
pub fn backfill(overall: OverallStatus, current_window: u32) -> BackfillStatus {
    BackfillStatus {
        overall_status: overall,
        current_window,
        total_windows: 10,
        attempt_count: 1,
        max_attempts: 3,
        per_type: BTreeMap::from([(
            "sleeps".to_string(),
            TypeProgress {
                succeeded: current_window,
                ..TypeProgress::default()
            },
        )]),
        ..BackfillStatus::default()
    }
}

#[allow(dead_code)]
pub fn sync(status: SyncState, current_day: u32) -> SyncProgress {
    SyncProgress {
        status,
        progress_percent: f64::from(current_day) * 10.0,
        current_data_type_index: 0,
        total_types: 3,
        current_data_type: Some("activity".to_string()),
        current_day,
        target_days: 10,
        errors: Vec::new(),
    }
}
