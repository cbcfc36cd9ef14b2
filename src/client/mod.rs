//! Page fetcher for the order history API

use crate::abstractions::OrderTransport;
use crate::auth::{order_page_path, AuthHeaders};
use crate::error::{Error, Result};
use crate::orders::OrderPage;
use std::sync::Arc;
use tracing::debug;

/// Fetches one page of orders. No retries.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn OrderTransport>,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn OrderTransport>) -> Self {
        Self { transport }
    }

    /// Request `page_number` with the given headers and validate the envelope.
    pub async fn fetch_page(&self, page_number: u32, headers: &AuthHeaders) -> Result<OrderPage> {
        let path = order_page_path(page_number);
        let response = self.transport.get(&path, headers).await?;

        if !response.is_success() {
            return Err(Error::Network(response.status_text));
        }

        let page = OrderPage::from_body(response.body)?;
        debug!("Page {} returned {} order(s)", page_number, page.orders.len());
        Ok(page)
    }
}
