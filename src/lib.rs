// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wearables-Admin: client core of the wearables integration dashboard
//!
//! This crate tracks provider backfill and sync jobs, pages through
//! cursor-paginated health summaries and resolves lookback date ranges
//! against the platform's REST backend.

pub mod config;
pub mod date_range;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;
pub mod time_utils;

use config::Config;
use date_range::DateInterval;
use error::Result;
use models::{SummaryKind, SummaryQuery};
use services::{ActivePolls, HealthDataGateway, StatusPoller, SummaryPager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<dyn HealthDataGateway>,
    pub poller: StatusPoller,
}

impl AppState {
    /// Wire up the gateway selected by `config`.
    pub fn new(config: Config) -> Result<Self> {
        let gateway = services::build_gateway(&config)?;
        Ok(Self::with_gateway(config, gateway))
    }

    /// Wire up an explicitly chosen gateway.
    pub fn with_gateway(config: Config, gateway: Arc<dyn HealthDataGateway>) -> Self {
        let poller = StatusPoller::new(config.poll_interval, ActivePolls::new());
        Self {
            config,
            gateway,
            poller,
        }
    }

    /// Pager over one user's summaries, using the configured page size.
    pub fn summary_pager(
        &self,
        user_id: impl Into<String>,
        kind: SummaryKind,
        range: DateInterval,
    ) -> SummaryPager {
        let query = SummaryQuery::new(range, self.config.page_limit);
        SummaryPager::new(Arc::clone(&self.gateway), user_id, kind, query)
    }
}
