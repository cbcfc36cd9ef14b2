//! HTTP transport abstraction
//!
//! Provides a trait-based seam around the order history API so the
//! pagination engine can be exercised without network access.

use crate::auth::{AuthHeaders, SessionArtifacts};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// What the transport hands back for one GET.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Decoded JSON body. `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            body: Some(body),
        }
    }

    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a credentialed GET against the provider.
///
/// Implementations attach the session cookies themselves; callers only
/// supply the path and the signed headers.
#[async_trait]
pub trait OrderTransport: Send + Sync {
    /// Issue `GET {path}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] when no response could be obtained at all
    /// (connection failure, timeout). HTTP error statuses are returned as a
    /// normal [`TransportResponse`].
    async fn get(&self, path: &str, headers: &AuthHeaders) -> Result<TransportResponse>;
}

/// Transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    cookie: Option<String>,
}

impl ReqwestTransport {
    pub fn new(
        base_url: impl Into<String>,
        session: &SessionArtifacts,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie: session.cookie_header(),
        })
    }

    fn header_map(&self, headers: &AuthHeaders) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(headers.len() + 1);

        for (name, value) in headers.iter() {
            let name = HeaderName::from_static(name);
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Network(format!("invalid value for header {name}: {e}")))?;
            map.insert(name, value);
        }

        if let Some(cookie) = &self.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| Error::Network(format!("invalid cookie header: {e}")))?;
            map.insert(COOKIE, value);
        }

        Ok(map)
    }
}

#[async_trait]
impl OrderTransport for ReqwestTransport {
    async fn get(&self, path: &str, headers: &AuthHeaders) -> Result<TransportResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.header_map(headers)?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Network(format!("request to {path} timed out"))
                } else {
                    Error::Network(format!("request to {path} failed: {e}"))
                }
            })?;

        let status = response.status();
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;
        trace!("{} returned {} bytes with status {}", path, bytes.len(), status);

        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

type RecordedRequests = Arc<Mutex<Vec<(String, AuthHeaders)>>>;

/// Scripted transport for tests.
///
/// Responses are served in the order they were added; every request is
/// recorded so tests can assert on paths and headers.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<Vec<Result<TransportResponse>>>>,
    requests: RecordedRequests,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for the next request
    pub async fn add_response(&self, response: Result<TransportResponse>) {
        self.responses.lock().await.push(response);
    }

    /// Add a 200 response with `body`
    pub async fn add_page(&self, body: Value) {
        self.add_response(Ok(TransportResponse::ok(body))).await;
    }

    /// Add an error status with no body
    pub async fn add_status(&self, status: u16, status_text: &str) {
        self.add_response(Ok(TransportResponse::status(status, status_text)))
            .await;
    }

    /// Paths requested so far
    pub async fn requested_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Headers of every request so far
    pub async fn requested_headers(&self) -> Vec<AuthHeaders> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(_, headers)| headers.clone())
            .collect()
    }
}

#[async_trait]
impl OrderTransport for MockTransport {
    async fn get(&self, path: &str, headers: &AuthHeaders) -> Result<TransportResponse> {
        self.requests
            .lock()
            .await
            .push((path.to_string(), headers.clone()));

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(Error::Network(format!("no mock response configured for {path}")));
        }
        responses.remove(0)
    }
}
