//! Session artifacts read from the provider's cookies
//!
//! The engine never reads cookies on its own. Whoever starts a run builds a
//! [`SessionArtifacts`] value (from flags, environment, config, or a raw
//! `Cookie:` header) and hands it in.

use serde::{Deserialize, Serialize};

/// Cookie holding the device identifier.
pub const DEVICE_ID_COOKIE: &str = "device_id";
/// Cookie holding the URL-encoded anti-forgery token.
pub const XSRF_TOKEN_COOKIE: &str = "XSRF-TOKEN";
/// Cookie holding the CSRF secret.
pub const CSRF_SECRET_COOKIE: &str = "csrfSecret";

/// The three cookie values a signed request is derived from.
///
/// Any of them may be absent. A missing value is signed as an empty segment
/// and the provider is left to reject the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionArtifacts {
    pub device_id: Option<String>,
    pub xsrf_token: Option<String>,
    pub csrf_secret: Option<String>,
    /// Extra cookies forwarded verbatim with every request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_cookies: Vec<(String, String)>,
}

impl SessionArtifacts {
    pub fn new(
        device_id: impl Into<String>,
        xsrf_token: impl Into<String>,
        csrf_secret: impl Into<String>,
    ) -> Self {
        Self {
            device_id: Some(device_id.into()),
            xsrf_token: Some(xsrf_token.into()),
            csrf_secret: Some(csrf_secret.into()),
            extra_cookies: Vec::new(),
        }
    }

    /// Parse a browser `Cookie:` header (`a=b; c=d`).
    ///
    /// The three well-known cookies are lifted into their fields; every other
    /// pair is kept so it can be sent back to the provider unchanged.
    pub fn from_cookie_header(header: &str) -> Self {
        let mut session = Self::default();

        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim().to_string();

            match name {
                DEVICE_ID_COOKIE => session.device_id = Some(value),
                XSRF_TOKEN_COOKIE => session.xsrf_token = Some(value),
                CSRF_SECRET_COOKIE => session.csrf_secret = Some(value),
                "" => {}
                other => session.extra_cookies.push((other.to_string(), value)),
            }
        }

        session
    }

    /// Fill in any field that is still absent from `other`.
    pub fn or(mut self, other: SessionArtifacts) -> Self {
        self.device_id = self.device_id.or(other.device_id);
        self.xsrf_token = self.xsrf_token.or(other.xsrf_token);
        self.csrf_secret = self.csrf_secret.or(other.csrf_secret);
        if self.extra_cookies.is_empty() {
            self.extra_cookies = other.extra_cookies;
        }
        self
    }

    pub fn device_id(&self) -> &str {
        self.device_id.as_deref().unwrap_or_default()
    }

    pub fn xsrf_token(&self) -> &str {
        self.xsrf_token.as_deref().unwrap_or_default()
    }

    pub fn csrf_secret(&self) -> &str {
        self.csrf_secret.as_deref().unwrap_or_default()
    }

    /// True when none of the three signing cookies is present.
    pub fn is_empty(&self) -> bool {
        self.device_id.is_none() && self.xsrf_token.is_none() && self.csrf_secret.is_none()
    }

    /// Render the `Cookie:` header the transport attaches to each request.
    pub fn cookie_header(&self) -> Option<String> {
        let known = [
            (DEVICE_ID_COOKIE, self.device_id.as_deref()),
            (XSRF_TOKEN_COOKIE, self.xsrf_token.as_deref()),
            (CSRF_SECRET_COOKIE, self.csrf_secret.as_deref()),
        ];

        let pairs: Vec<String> = known
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
            .chain(
                self.extra_cookies
                    .iter()
                    .map(|(name, value)| format!("{name}={value}")),
            )
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Presence summary safe to put in logs.
    pub fn describe(&self) -> String {
        let mark = |v: &Option<String>| if v.is_some() { "set" } else { "missing" };
        format!(
            "device_id={}, xsrf_token={}, csrf_secret={}",
            mark(&self.device_id),
            mark(&self.xsrf_token),
            mark(&self.csrf_secret)
        )
    }
}
