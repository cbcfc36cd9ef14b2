//! Testing utilities and fixtures
//!
//! This module provides payload fixtures and a scripted API harness for
//! exercising the aggregation engine without network access.

pub mod fixtures;

use crate::abstractions::MockTransport;
use crate::auth::SessionArtifacts;
use crate::config::ApiConfig;
use crate::error::Result;
use crate::service::OrderDigest;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

/// Test context wiring an [`OrderDigest`] to a [`MockTransport`]
pub struct TestContext {
    pub transport: MockTransport,
    pub digest: OrderDigest,
}

impl TestContext {
    /// Create a context whose clock is pinned to `today`, evaluated in UTC
    pub fn new(today: NaiveDate) -> Result<Self> {
        Self::with_config(today, ApiConfig::default())
    }

    pub fn with_config(today: NaiveDate, mut api: ApiConfig) -> Result<Self> {
        api.utc_offset_minutes = Some(0);
        let transport = MockTransport::new();
        let digest = OrderDigest::new(
            &api,
            SessionArtifacts::new("test-device", "test%20xsrf", "test-secret"),
            Arc::new(transport.clone()),
        )?
        .with_today(today);

        Ok(Self { transport, digest })
    }

    /// Queue successful pages in request order
    pub async fn with_pages(self, pages: Vec<Value>) -> Self {
        for page in pages {
            self.transport.add_page(page).await;
        }
        self
    }
}
