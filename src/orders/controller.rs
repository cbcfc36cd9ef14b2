//! Pagination controller
//!
//! Drives the fetch loop one page at a time:
//!
//! ```text
//! Requesting(1) -> Processing -> Deciding -> Requesting(n+1)
//!                                        \-> Done
//!      any failure ------------------------> Failed
//! ```
//!
//! The provider never says which page is the last one. Orders come back
//! newest first, so the loop stops at the first page that is empty or that
//! contains an order from the month before the target. A hard page ceiling
//! guards against a provider that breaks that ordering.

use super::aggregator::Aggregator;
use super::filter::{split_page, MonthWindow};
use super::model::{AggregatedProduct, OrderPage};
use crate::auth::{AuthHeaders, SessionArtifacts, SignatureDeriver};
use crate::client::PageFetcher;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Shared flag a consumer sets to stop a run before its next request.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub max_pages: u32,
    /// Sign requests with session cookies. When off, only the extension
    /// `request-signature` is sent.
    pub sign_requests: bool,
    pub cdn_prefix: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            sign_requests: true,
            cdn_prefix: crate::config::DEFAULT_CDN_PREFIX.to_string(),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    pub products: Vec<AggregatedProduct>,
    pub pages_fetched: u32,
    pub orders_seen: usize,
    pub skipped_orders: usize,
}

#[derive(Debug)]
enum RunState {
    Requesting(u32),
    Processing {
        page: u32,
        data: OrderPage,
    },
    Deciding {
        page: u32,
        order_count: usize,
        boundary_found: bool,
    },
    Done,
    Failed(Error),
}

/// Bookkeeping for a single run. Never shared between runs.
struct RunProgress {
    aggregator: Aggregator,
    pages_fetched: u32,
    orders_seen: usize,
}

pub struct PaginationController {
    fetcher: PageFetcher,
    deriver: SignatureDeriver,
    settings: ControllerSettings,
}

impl PaginationController {
    pub fn new(
        fetcher: PageFetcher,
        deriver: SignatureDeriver,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            fetcher,
            deriver,
            settings,
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Page through the order history until `window` is fully covered.
    ///
    /// Any network or envelope failure aborts the run and discards whatever
    /// was aggregated so far.
    pub async fn run(
        &self,
        session: &SessionArtifacts,
        window: &MonthWindow,
        cancel: &CancelFlag,
    ) -> Result<AggregationOutcome> {
        info!(
            "Aggregating orders for {} ({})",
            window.label(),
            session.describe()
        );

        let mut progress = RunProgress {
            aggregator: Aggregator::new(self.settings.cdn_prefix.clone()),
            pages_fetched: 0,
            orders_seen: 0,
        };
        let mut state = RunState::Requesting(1);

        loop {
            state = match state {
                RunState::Requesting(page) => {
                    self.request(page, session, cancel, &mut progress).await
                }
                RunState::Processing { page, data } => {
                    let split = split_page(window, &data.orders);
                    debug!(
                        "Page {}: {} in scope, {} boundary, {} total",
                        page,
                        split.in_scope.len(),
                        split.boundary,
                        data.orders.len()
                    );
                    progress.aggregator.fold(split.in_scope.iter().copied());
                    progress.orders_seen += data.orders.len();

                    RunState::Deciding {
                        page,
                        order_count: data.orders.len(),
                        boundary_found: split.has_boundary(),
                    }
                }
                RunState::Deciding {
                    page,
                    order_count,
                    boundary_found,
                } => self.decide(page, order_count, boundary_found),
                RunState::Done => {
                    let outcome = AggregationOutcome {
                        pages_fetched: progress.pages_fetched,
                        orders_seen: progress.orders_seen,
                        skipped_orders: progress.aggregator.skipped_orders(),
                        products: progress.aggregator.into_products(),
                    };
                    info!(
                        "Aggregated {} product(s) from {} order(s) over {} page(s)",
                        outcome.products.len(),
                        outcome.orders_seen,
                        outcome.pages_fetched
                    );
                    return Ok(outcome);
                }
                RunState::Failed(e) => {
                    debug!("Aggregation failed after {} page(s): {}", progress.pages_fetched, e);
                    return Err(e);
                }
            };
        }
    }

    async fn request(
        &self,
        page: u32,
        session: &SessionArtifacts,
        cancel: &CancelFlag,
        progress: &mut RunProgress,
    ) -> RunState {
        if cancel.is_cancelled() {
            return RunState::Failed(Error::Cancelled(page));
        }

        let headers = self.headers_for(session, page);
        let result = self.fetcher.fetch_page(page, &headers).await;
        progress.pages_fetched += 1;

        // The request was allowed to finish but nobody wants its result.
        if cancel.is_cancelled() {
            return RunState::Failed(Error::Cancelled(page + 1));
        }

        match result {
            Ok(data) => RunState::Processing { page, data },
            Err(e) => RunState::Failed(e),
        }
    }

    fn headers_for(&self, session: &SessionArtifacts, page: u32) -> AuthHeaders {
        if !self.settings.sign_requests {
            return AuthHeaders::unsigned(self.deriver.extension_id());
        }

        let (ctx, headers) = self.deriver.sign_page(session, page);
        tracing::trace!(
            "Signed page {} with request id {} (signature {})",
            page,
            ctx.request_id,
            ctx.signature
        );
        headers
    }

    fn decide(&self, page: u32, order_count: usize, boundary_found: bool) -> RunState {
        if order_count == 0 {
            debug!("Page {} is empty, stopping", page);
            RunState::Done
        } else if boundary_found {
            debug!("Page {} reached the previous month, stopping", page);
            RunState::Done
        } else if page >= self.settings.max_pages {
            RunState::Failed(Error::PageLimitExceeded(page))
        } else {
            RunState::Requesting(page + 1)
        }
    }
}
