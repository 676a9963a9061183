// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - sync, polling and pagination logic over the gateway.

pub mod backfill;
pub mod fixture;
pub mod gateway;
pub mod pager;
pub mod poller;

pub use backfill::{BackfillPhase, BackfillView, FailedType, TimedOutType};
pub use fixture::{FixtureGateway, GatewayCall};
pub use gateway::{HealthDataGateway, HttpGateway, RetryPolicy};
pub use pager::SummaryPager;
pub use poller::{
    ActivePolls, PollClaim, PollJob, PollKey, PollOutcome, PollSnapshot, PolledStatus,
    StatusPoller, StopReason, SyncDisplay,
};

use crate::config::{Config, GatewayMode};
use crate::error::Result;
use std::sync::Arc;

/// Build the gateway selected by configuration.
pub fn build_gateway(config: &Config) -> Result<Arc<dyn HealthDataGateway>> {
    match config.gateway_mode {
        GatewayMode::Http => {
            tracing::info!(api_url = %config.api_url, "Using HTTP gateway");
            Ok(Arc::new(HttpGateway::new(config)?))
        }
        GatewayMode::Fixture => {
            tracing::info!("Using fixture gateway with demo data");
            Ok(Arc::new(FixtureGateway::with_demo_data()))
        }
    }
}
