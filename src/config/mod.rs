use crate::auth::SessionArtifacts;
use crate::error::{Error, Result};
use crate::orders::controller::{ControllerSettings, DEFAULT_MAX_PAGES};
use chrono::{FixedOffset, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

pub const DEFAULT_API_BASE_URL: &str = "https://api.zeptonow.com";
pub const DEFAULT_CDN_PREFIX: &str = "https://cdn.zeptonow.com/production/";
pub const DEFAULT_EXTENSION_ID: &str = "mpjoccodbkaipkldddemmdlladmldooc";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_PREFIX: &str = "ORDER_DIGEST_";

/// Get the directory holding `config.toml`
pub fn get_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "order-digest", "order-digest")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub cdn_prefix: String,
    pub extension_id: String,
    pub request_timeout_secs: u64,
    pub max_pages: u32,
    pub sign_requests: bool,
    /// Offset used to decide which month an order falls in. Defaults to the
    /// machine's local offset.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            cdn_prefix: DEFAULT_CDN_PREFIX.to_string(),
            extension_id: DEFAULT_EXTENSION_ID.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_pages: DEFAULT_MAX_PAGES,
            sign_requests: true,
            utc_offset_minutes: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
                Error::Config(format!("utc_offset_minutes out of range: {minutes}"))
            }),
            None => Ok(*Local::now().offset()),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            max_pages: self.max_pages,
            sign_requests: self.sign_requests,
            cdn_prefix: self.cdn_prefix.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        self.utc_offset().map(|_| ())
    }
}

/// Session cookies kept in the config file or environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub device_id: Option<String>,
    pub xsrf_token: Option<String>,
    pub csrf_secret: Option<String>,
    /// Raw `Cookie:` header copied from the browser.
    pub cookie: Option<String>,
}

impl SessionConfig {
    /// Individual values win over the ones found in `cookie`.
    pub fn artifacts(&self) -> SessionArtifacts {
        let explicit = SessionArtifacts {
            device_id: self.device_id.clone(),
            xsrf_token: self.xsrf_token.clone(),
            csrf_secret: self.csrf_secret.clone(),
            extra_cookies: Vec::new(),
        };

        match &self.cookie {
            Some(header) => explicit.or(SessionArtifacts::from_cookie_header(header)),
            None => explicit,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply `ORDER_DIGEST_*` overrides read through `lookup`.
    pub fn merge_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(url) = var("BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(prefix) = var("CDN_PREFIX") {
            self.api.cdn_prefix = prefix;
        }
        if let Some(id) = var("EXTENSION_ID") {
            self.api.extension_id = id;
        }
        if let Some(secs) = var("TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.api.request_timeout_secs = secs;
        }
        if let Some(pages) = var("MAX_PAGES").and_then(|v| v.parse().ok()) {
            self.api.max_pages = pages;
        }
        if let Some(sign) = var("SIGN_REQUESTS").and_then(|v| v.parse().ok()) {
            self.api.sign_requests = sign;
        }
        if let Some(minutes) = var("UTC_OFFSET_MINUTES").and_then(|v| v.parse().ok()) {
            self.api.utc_offset_minutes = Some(minutes);
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = Some(level);
        }

        if let Some(device_id) = var("DEVICE_ID") {
            self.session.device_id = Some(device_id);
        }
        if let Some(token) = var("XSRF_TOKEN") {
            self.session.xsrf_token = Some(token);
        }
        if let Some(secret) = var("CSRF_SECRET") {
            self.session.csrf_secret = Some(secret);
        }
        if let Some(cookie) = var("COOKIE") {
            self.session.cookie = Some(cookie);
        }
    }
}
