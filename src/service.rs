//! Entry point consumed by the presentation layer
//!
//! [`OrderDigest`] owns the session, the clock and the controller, and
//! exposes a single `run_aggregation(month)` call. Overlapping calls follow
//! a last-result-wins policy: starting a run cancels the one before it, and
//! the older run reports [`Error::Superseded`] instead of a result.

use crate::abstractions::{OrderTransport, ReqwestTransport};
use crate::auth::{SessionArtifacts, SignatureDeriver};
use crate::client::PageFetcher;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::orders::{
    AggregatedProduct, AggregationOutcome, CancelFlag, MonthWindow, PaginationController,
};
use chrono::{FixedOffset, NaiveDate, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

pub struct OrderDigest {
    controller: PaginationController,
    session: SessionArtifacts,
    offset: Option<FixedOffset>,
    today: Option<NaiveDate>,
    generation: AtomicU64,
    current: Mutex<CancelFlag>,
}

impl OrderDigest {
    /// Fails when `api.utc_offset_minutes` is out of range. Without it the
    /// local offset is read on every use.
    pub fn new(
        api: &ApiConfig,
        session: SessionArtifacts,
        transport: Arc<dyn OrderTransport>,
    ) -> Result<Self> {
        let offset = match api.utc_offset_minutes {
            Some(_) => Some(api.utc_offset()?),
            None => None,
        };
        let controller = PaginationController::new(
            PageFetcher::new(transport),
            SignatureDeriver::new(api.extension_id.clone()),
            api.controller_settings(),
        );

        Ok(Self {
            controller,
            session,
            offset,
            today: None,
            generation: AtomicU64::new(0),
            current: Mutex::new(CancelFlag::new()),
        })
    }

    /// Build a digest talking to the real API.
    pub fn connect(api: &ApiConfig, session: SessionArtifacts) -> Result<Self> {
        api.validate()?;
        let transport = ReqwestTransport::new(&api.base_url, &session, api.request_timeout())?;
        Self::new(api, session, Arc::new(transport))
    }

    /// Pin the calendar date used to resolve the target year.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn offset(&self) -> FixedOffset {
        self.offset.unwrap_or_else(|| *chrono::Local::now().offset())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| Utc::now().with_timezone(&self.offset()).date_naive())
    }

    /// The month/year window `target_month` refers to today.
    pub fn window(&self, target_month: u32) -> Result<MonthWindow> {
        MonthWindow::resolve(target_month, self.today(), self.offset())
    }

    /// Aggregate the products ordered in `target_month` (0-11).
    pub async fn run_aggregation(&self, target_month: u32) -> Result<Vec<AggregatedProduct>> {
        self.run(target_month).await.map(|outcome| outcome.products)
    }

    /// Like [`run_aggregation`](Self::run_aggregation) but with run statistics.
    pub async fn run(&self, target_month: u32) -> Result<AggregationOutcome> {
        let window = self.window(target_month)?;
        let (ticket, cancel) = self.start_run();

        let result = self.controller.run(&self.session, &window, &cancel).await;

        if self.generation.load(Ordering::Acquire) != ticket {
            debug!("Run {} finished after a newer run started", ticket);
            return Err(Error::Superseded);
        }
        result
    }

    /// Stop the current run before its next page request.
    pub fn cancel(&self) {
        self.current_flag().cancel();
    }

    fn current_flag(&self) -> CancelFlag {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn start_run(&self) -> (u64, CancelFlag) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.cancel();

        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let flag = CancelFlag::new();
        *current = flag.clone();
        (ticket, flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractions::{MockTransport, TransportResponse};
    use crate::auth::AuthHeaders;
    use crate::testing::fixtures::{delivered_order, orders_page};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    /// Holds the first request until released.
    struct GatedTransport {
        inner: MockTransport,
        gate_first: AtomicBool,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl OrderTransport for GatedTransport {
        async fn get(&self, path: &str, headers: &AuthHeaders) -> Result<TransportResponse> {
            if self.gate_first.swap(false, Ordering::AcqRel) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.get(path, headers).await
        }
    }

    fn api() -> ApiConfig {
        ApiConfig {
            utc_offset_minutes: Some(0),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn digest(transport: Arc<dyn OrderTransport>) -> OrderDigest {
        OrderDigest::new(&api(), SessionArtifacts::new("d", "x", "s"), transport)
            .unwrap()
            .with_today(today())
    }

    fn gated(inner: &MockTransport) -> (Arc<GatedTransport>, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let transport = Arc::new(GatedTransport {
            inner: inner.clone(),
            gate_first: AtomicBool::new(true),
            entered: entered.clone(),
            release: release.clone(),
        });
        (transport, entered, release)
    }

    #[test]
    fn test_window_resolution_uses_pinned_today() {
        let digest = digest(Arc::new(MockTransport::new()));
        let current = digest.window(9).unwrap();
        assert_eq!((current.month, current.year), (9, 2026));

        let later = digest.window(10).unwrap();
        assert_eq!((later.month, later.year), (10, 2025));

        assert!(matches!(digest.window(12), Err(Error::InvalidMonth(12))));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let api = ApiConfig {
            utc_offset_minutes: Some(24 * 60),
            ..Default::default()
        };
        let result = OrderDigest::new(
            &api,
            SessionArtifacts::default(),
            Arc::new(MockTransport::new()),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unset_offset_follows_local_time() {
        let api = ApiConfig {
            utc_offset_minutes: None,
            ..Default::default()
        };
        let digest = OrderDigest::new(
            &api,
            SessionArtifacts::default(),
            Arc::new(MockTransport::new()),
        )
        .unwrap();
        assert_eq!(digest.offset(), *chrono::Local::now().offset());
    }

    #[tokio::test]
    async fn test_invalid_month_makes_no_requests() {
        let mock = MockTransport::new();
        let err = digest(Arc::new(mock.clone()))
            .run_aggregation(13)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMonth(13)));
        assert!(mock.requested_paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_aggregation_returns_products() {
        let mock = MockTransport::new();
        mock.add_page(orders_page(vec![delivered_order(
            "2026-10-02T08:00:00Z",
            json!([{"name": "Milk", "count": 1}]),
        )]))
        .await;
        mock.add_page(orders_page(vec![])).await;

        let products = digest(Arc::new(mock.clone()))
            .run_aggregation(9)
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Milk");
    }

    #[tokio::test]
    async fn test_cancel_discards_in_flight_page() {
        let mock = MockTransport::new();
        mock.add_page(orders_page(vec![delivered_order(
            "2026-10-02T08:00:00Z",
            json!([{"name": "Milk", "count": 1}]),
        )]))
        .await;
        let (transport, entered, release) = gated(&mock);
        let digest = Arc::new(digest(transport));

        let running = {
            let digest = digest.clone();
            tokio::spawn(async move { digest.run_aggregation(9).await })
        };
        entered.notified().await;
        digest.cancel();
        release.notify_one();

        let err = running.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
        assert_eq!(mock.requested_paths().await.len(), 1);
    }

    #[tokio::test]
    async fn test_newer_run_supersedes_older_one() {
        let mock = MockTransport::new();
        mock.add_page(orders_page(vec![])).await;
        mock.add_page(orders_page(vec![])).await;
        let (transport, entered, release) = gated(&mock);
        let digest = Arc::new(digest(transport));

        let older = {
            let digest = digest.clone();
            tokio::spawn(async move { digest.run_aggregation(9).await })
        };
        entered.notified().await;

        let newer = digest.run_aggregation(9).await;
        release.notify_one();

        assert!(newer.unwrap().is_empty());
        assert!(matches!(older.await.unwrap(), Err(Error::Superseded)));
    }
}
