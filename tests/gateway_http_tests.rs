// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP gateway contract tests.
//!
//! These tests verify that:
//! 1. Requests use the documented paths, query parameters and auth header
//! 2. Transport failures and 5xx responses are retried a bounded number of times
//! 3. 4xx responses are returned immediately
//! 4. A body cut short of its Content-Length is a retryable transport error

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wearables_admin::error::AppError;
use wearables_admin::models::{OverallStatus, PaginationCursor, SummaryKind, SyncState};
use wearables_admin::services::{backfill, BackfillPhase, HealthDataGateway};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const BACKFILL_STATUS_PATH: &str = "/api/v1/providers/garmin/users/user-1/backfill/status";

#[tokio::test]
async fn test_fetch_summaries_sends_range_cursor_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/user-1/summaries/sleep"))
        .and(query_param("start_date", "2025-01-03T00:00:00Z"))
        .and(query_param("end_date", "2025-01-11T00:00:00Z"))
        .and(query_param("limit", "25"))
        .and(query_param("sort_order", "desc"))
        .and(query_param("cursor", "eyJpZCI6NDJ9"))
        .and(header("X-Open-Wearables-API-Key", "test_api_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"date": "2025-01-09", "duration_minutes": 431}],
            "pagination": {
                "next_cursor": "eyJpZCI6NDN9",
                "previous_cursor": null,
                "has_more": true
            },
            "metadata": {"sample_count": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let cursor = PaginationCursor::new("eyJpZCI6NDJ9");
    let page = gateway
        .fetch_summaries("user-1", SummaryKind::Sleep, &common::week_query(25), Some(&cursor))
        .await
        .expect("Failed to fetch summaries");

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.next_cursor().map(|c| c.as_str()), Some("eyJpZCI6NDN9"));
}

#[tokio::test]
async fn test_invalid_limit_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let err = gateway
        .fetch_summaries("user-1", SummaryKind::Activity, &common::week_query(0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_5xx_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BACKFILL_STATUS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(BACKFILL_STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "overall_status": "in_progress",
            "current_window": 3,
            "total_windows": 10,
            "attempt_count": 1,
            "max_attempts": 3,
            "per_type": {"sleeps": {"succeeded": 2, "failed": 0, "timed_out": 1}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let status = gateway
        .backfill_status("user-1")
        .await
        .expect("Retries should recover from 503");

    assert_eq!(status.overall_status, OverallStatus::InProgress);
    assert_eq!(backfill::phase(&status), BackfillPhase::Running);
    assert!(backfill::timed_out_types(&status).is_empty());
}

#[tokio::test]
async fn test_5xx_gives_up_after_retry_bound() {
    let server = MockServer::start().await;

    // One attempt plus max_retries (2) retries
    Mock::given(method("GET"))
        .and(path(BACKFILL_STATUS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let err = gateway.backfill_status("user-1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_4xx_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BACKFILL_STATUS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("no garmin connection"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let err = gateway.backfill_status("user-1").await.unwrap_err();
    match err {
        AppError::Http { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no garmin connection");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BACKFILL_STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let err = gateway.backfill_status("user-1").await.unwrap_err();
    assert!(matches!(err, AppError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on this port once the server is dropped
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let gateway = common::http_gateway(&uri);
    let err = gateway.backfill_status("user-1").await.unwrap_err();
    assert!(matches!(err, AppError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_retry_type_and_cancel_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/providers/garmin/users/user-1/backfill/sleeps/retry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "type": "sleeps",
            "status": "retry_in_progress"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/providers/garmin/users/user-1/backfill/cancel"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());
    let response = gateway
        .retry_backfill_type("user-1", "sleeps")
        .await
        .expect("Retry request failed");
    assert!(response.success);
    assert_eq!(response.type_name, "sleeps");

    gateway
        .cancel_backfill("user-1")
        .await
        .expect("Cancel request failed");
}

#[tokio::test]
async fn test_summary_sync_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/providers/garmin/users/user-1/sync"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SYNCING",
            "progress_percent": 0,
            "current_data_type_index": 0,
            "total_types": 4,
            "current_day": 0,
            "target_days": 30,
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/providers/garmin/users/user-1/sync/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "WAITING",
            "progress_percent": 35.5,
            "current_data_type_index": 1,
            "total_types": 4,
            "current_day": 11,
            "target_days": 30,
            "errors": [{"data_type": "sleep", "error": "rate limited"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/providers/garmin/users/user-1/sync/cancel"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"cancelled": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::http_gateway(&server.uri());

    let started = gateway.start_summary_sync("user-1", 30).await.unwrap();
    assert_eq!(started.status, SyncState::Syncing);
    assert_eq!(started.target_days, 30);

    let progress = gateway.summary_sync_status("user-1").await.unwrap();
    assert_eq!(progress.status, SyncState::Waiting);
    assert!(progress.status.is_active());
    assert_eq!(progress.last_error().unwrap().data_type, "sleep");

    gateway.cancel_summary_sync("user-1").await.unwrap();
}

#[tokio::test]
async fn test_session_token_sent_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BACKFILL_STATUS_PATH))
        .and(header("Authorization", "Bearer session-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "overall_status": "completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::test_config(&server.uri());
    config.api_key = None;
    config.session_token = Some("session-abc".to_string());
    let gateway = wearables_admin::services::HttpGateway::new(&config).unwrap();

    let status = gateway.backfill_status("user-1").await.unwrap();
    assert_eq!(backfill::phase(&status), BackfillPhase::Completed);
}

/// Serve every connection a 200 whose body stops short of its Content-Length.
async fn spawn_truncating_server(hits: Arc<AtomicUsize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            hits.fetch_add(1, Ordering::SeqCst);
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = "HTTP/1.1 200 OK\r\n\
                            Content-Type: application/json\r\n\
                            Content-Length: 500\r\n\r\n\
                            {\"overall_status\":\"compl";
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_truncated_body_is_retried_as_transport_error() {
    let hits = Arc::new(AtomicUsize::new(0));
    let uri = spawn_truncating_server(Arc::clone(&hits)).await;

    let gateway = common::http_gateway(&uri);
    let err = gateway.backfill_status("user-1").await.unwrap_err();

    assert!(matches!(err, AppError::Network(_)), "got {:?}", err);
    assert!(err.is_retryable());
    // One attempt plus max_retries (2) retries
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
