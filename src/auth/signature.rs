//! Request signing for the order history API
//!
//! Every page request carries a signature bound to the request path, the
//! HTTP method and a single-use request id. The provider checks it against
//! the session cookies, so a captured signature cannot be replayed for a
//! different page.
//!
//! The canonical string is
//! `undefined|{device_id}|get|{request_id}|{xsrf_token}|{path}` and both
//! hashes are lowercase hex SHA-256.

use super::session::SessionArtifacts;
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

pub const HEADER_CSRF_SECRET: &str = "x-csrf-secret";
pub const HEADER_TIMEZONE: &str = "x-timezone";
pub const HEADER_XSRF_TOKEN: &str = "x-xsrf-token";
pub const HEADER_DEVICE_ID: &str = "device_id";
pub const HEADER_REQUEST_ID: &str = "request_id";
pub const HEADER_REQUEST_SIGNATURE: &str = "request-signature";
pub const HEADER_EXTENSION_ID: &str = "x-chrome-extension-id";

const SIGNATURE_SEPARATOR: &str = "|";
const SIGNED_METHOD: &str = "get";
// The web client signs with an unset first segment, which it stringifies.
const LEADING_SEGMENT: &str = "undefined";

/// Path of one page of the order history, including its query string.
pub fn order_page_path(page_number: u32) -> String {
    format!("/api/v2/order/?page_number={page_number}")
}

/// Single-use identifier sent as `request_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values derived for one page request. Dropped once the request is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequestContext {
    pub request_id: RequestId,
    pub page_number: u32,
    pub path: String,
    pub signature: String,
    pub timezone: String,
    pub decoded_xsrf_token: String,
}

/// Ordered header list handed to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders(Vec<(&'static str, String)>);

impl AuthHeaders {
    /// Headers for the unauthenticated variant of the client.
    pub fn unsigned(extension_id: &str) -> Self {
        Self(vec![(
            HEADER_REQUEST_SIGNATURE,
            format!("chrome-extension-{extension_id}"),
        )])
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derives the signed header set from session cookies.
#[derive(Debug, Clone)]
pub struct SignatureDeriver {
    extension_id: String,
}

impl SignatureDeriver {
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
        }
    }

    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    /// Derive the per-request values for `page_number`.
    pub fn derive(
        &self,
        session: &SessionArtifacts,
        request_id: RequestId,
        page_number: u32,
    ) -> PageRequestContext {
        let path = order_page_path(page_number);
        let decoded_xsrf_token = decode_xsrf_token(session.xsrf_token());

        let canonical = [
            LEADING_SEGMENT,
            session.device_id(),
            SIGNED_METHOD,
            request_id.as_str(),
            decoded_xsrf_token.as_str(),
            path.as_str(),
        ]
        .join(SIGNATURE_SEPARATOR);

        let signature = sha256_hex(&canonical);
        let timezone = sha256_hex(&signature);

        PageRequestContext {
            request_id,
            page_number,
            path,
            signature,
            timezone,
            decoded_xsrf_token,
        }
    }

    /// Full header set for a signed request.
    pub fn headers(&self, session: &SessionArtifacts, ctx: &PageRequestContext) -> AuthHeaders {
        AuthHeaders(vec![
            (HEADER_CSRF_SECRET, session.csrf_secret().to_string()),
            (HEADER_TIMEZONE, ctx.timezone.clone()),
            (HEADER_XSRF_TOKEN, ctx.decoded_xsrf_token.clone()),
            (HEADER_DEVICE_ID, session.device_id().to_string()),
            (HEADER_REQUEST_ID, ctx.request_id.to_string()),
            (HEADER_REQUEST_SIGNATURE, ctx.signature.clone()),
            (HEADER_EXTENSION_ID, self.extension_id.clone()),
        ])
    }

    /// Derive with a fresh request id and return the headers in one step.
    pub fn sign_page(
        &self,
        session: &SessionArtifacts,
        page_number: u32,
    ) -> (PageRequestContext, AuthHeaders) {
        let ctx = self.derive(session, RequestId::generate(), page_number);
        let headers = self.headers(session, &ctx);
        (ctx, headers)
    }
}

/// Percent-decode the cookie value. Undecodable input is kept verbatim.
fn decode_xsrf_token(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
