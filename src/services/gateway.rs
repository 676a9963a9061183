// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request gateway to the wearables REST backend.
//!
//! Handles:
//! - Summary pages (cursor paginated)
//! - Garmin backfill status, per-type retry and cancellation
//! - Summary sync start, status and cancellation
//! - Bounded retry with linear backoff on transport errors and 5xx

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    BackfillStatus, Page, PaginationCursor, RetryTypeResponse, SummaryKind, SummaryQuery,
    SyncProgress,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use validator::Validate;

/// Header carrying the admin API key.
pub const API_KEY_HEADER: &str = "X-Open-Wearables-API-Key";

/// Provider whose long-running jobs this client drives.
const PROVIDER: &str = "garmin";

/// Backend operations the sync and pagination core depends on.
///
/// Chosen once at startup: [`HttpGateway`] against the real backend, or
/// [`crate::services::FixtureGateway`] for tests and offline demos.
#[async_trait]
pub trait HealthDataGateway: Send + Sync {
    /// Fetch one page of daily summaries. `cursor = None` is the first page.
    async fn fetch_summaries(
        &self,
        user_id: &str,
        kind: SummaryKind,
        query: &SummaryQuery,
        cursor: Option<&PaginationCursor>,
    ) -> Result<Page<serde_json::Value>>;

    async fn backfill_status(&self, user_id: &str) -> Result<BackfillStatus>;

    /// Ask the backend to retry one timed-out data type.
    async fn retry_backfill_type(&self, user_id: &str, type_name: &str)
        -> Result<RetryTypeResponse>;

    async fn cancel_backfill(&self, user_id: &str) -> Result<()>;

    /// Start a summary sync covering the last `days` days.
    async fn start_summary_sync(&self, user_id: &str, days: u32) -> Result<SyncProgress>;

    async fn summary_sync_status(&self, user_id: &str) -> Result<SyncProgress>;

    async fn cancel_summary_sync(&self, user_id: &str) -> Result<()>;
}

/// Retry schedule for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay step; attempt `n` waits `n * backoff`
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// HTTP implementation of [`HealthDataGateway`].
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    session_token: Option<String>,
    retry: RetryPolicy,
}

impl HttpGateway {
    /// Build a gateway from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: format!("{}/api/v1", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            session_token: config.session_token.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.retry_backoff,
            },
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn provider_path(&self, user_id: &str, rest: &str) -> String {
        format!(
            "/providers/{}/users/{}/{}",
            PROVIDER,
            urlencoding::encode(user_id),
            rest
        )
    }

    /// Send a request, retrying transient failures, and return the body text.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            match self.execute_once(method.clone(), &url, query).await {
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying backend request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if err.is_retryable() {
                        tracing::error!(
                            method = %method,
                            url = %url,
                            error = %err,
                            "Backend request failed after retries"
                        );
                    }
                    return Err(err);
                }
                Ok(body) => return Ok(body),
            }
        }
    }

    async fn execute_once(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String> {
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            if status.as_u16() == 429 {
                tracing::warn!("Backend rate limit hit (429)");
            }
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::http(status, body));
        }

        response.text().await.map_err(body_read_error)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.execute(Method::GET, path, query).await?;
        parse_json(&body)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.execute(Method::POST, path, query).await?;
        parse_json(&body)
    }
}

/// A body that stops arriving is a transport failure, not a malformed one.
fn body_read_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout
    } else {
        AppError::Network(format!("Failed to read response body: {}", err))
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))
}

#[async_trait]
impl HealthDataGateway for HttpGateway {
    async fn fetch_summaries(
        &self,
        user_id: &str,
        kind: SummaryKind,
        query: &SummaryQuery,
        cursor: Option<&PaginationCursor>,
    ) -> Result<Page<serde_json::Value>> {
        query.validate()?;

        let path = format!(
            "/users/{}/summaries/{}",
            urlencoding::encode(user_id),
            kind.as_str()
        );
        let mut params = query.query_params();
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.as_str().to_string()));
        }

        self.get_json(&path, &params).await
    }

    async fn backfill_status(&self, user_id: &str) -> Result<BackfillStatus> {
        self.get_json(&self.provider_path(user_id, "backfill/status"), &[])
            .await
    }

    async fn retry_backfill_type(
        &self,
        user_id: &str,
        type_name: &str,
    ) -> Result<RetryTypeResponse> {
        let rest = format!("backfill/{}/retry", urlencoding::encode(type_name));
        let response: RetryTypeResponse =
            self.post_json(&self.provider_path(user_id, &rest), &[]).await?;
        tracing::info!(
            user_id = %user_id,
            data_type = %type_name,
            success = response.success,
            "Backfill retry requested"
        );
        Ok(response)
    }

    async fn cancel_backfill(&self, user_id: &str) -> Result<()> {
        self.execute(Method::POST, &self.provider_path(user_id, "backfill/cancel"), &[])
            .await?;
        tracing::info!(user_id = %user_id, "Backfill cancellation requested");
        Ok(())
    }

    async fn start_summary_sync(&self, user_id: &str, days: u32) -> Result<SyncProgress> {
        let progress: SyncProgress = self
            .post_json(
                &self.provider_path(user_id, "sync"),
                &[("days", days.to_string())],
            )
            .await?;
        tracing::info!(user_id = %user_id, days, "Summary sync started");
        Ok(progress)
    }

    async fn summary_sync_status(&self, user_id: &str) -> Result<SyncProgress> {
        self.get_json(&self.provider_path(user_id, "sync/status"), &[])
            .await
    }

    async fn cancel_summary_sync(&self, user_id: &str) -> Result<()> {
        self.execute(Method::POST, &self.provider_path(user_id, "sync/cancel"), &[])
            .await?;
        tracing::info!(user_id = %user_id, "Summary sync cancellation requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(250),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(3), Duration::from_millis(750));
    }

    #[test]
    fn test_gateway_from_config() {
        let config = Config {
            api_url: "https://admin.example.com/".to_string(),
            max_retries: 4,
            ..Config::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.base_url, "https://admin.example.com/api/v1");
        assert_eq!(gateway.retry_policy().max_retries, 4);
        assert_eq!(
            gateway.provider_path("user 1", "backfill/status"),
            "/providers/garmin/users/user%201/backfill/status"
        );
    }
}
