//! Common test utilities and helpers

#![allow(dead_code)]

use assert_cmd::Command;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "ORDER_DIGEST_BASE_URL",
    "ORDER_DIGEST_CDN_PREFIX",
    "ORDER_DIGEST_EXTENSION_ID",
    "ORDER_DIGEST_TIMEOUT_SECS",
    "ORDER_DIGEST_MAX_PAGES",
    "ORDER_DIGEST_SIGN_REQUESTS",
    "ORDER_DIGEST_UTC_OFFSET_MINUTES",
    "ORDER_DIGEST_LOG_LEVEL",
    "ORDER_DIGEST_DEVICE_ID",
    "ORDER_DIGEST_XSRF_TOKEN",
    "ORDER_DIGEST_CSRF_SECRET",
    "ORDER_DIGEST_COOKIE",
];

/// The date every scripted scenario is evaluated on
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Isolated CLI invocation with its own config file
pub struct CliTest {
    temp_dir: TempDir,
    config_path: PathBuf,
    env: Vec<(String, String)>,
}

impl CliTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();
        Self {
            temp_dir,
            config_path,
            env: Vec::new(),
        }
    }

    pub fn with_config(self, content: &str) -> Self {
        fs::write(&self.config_path, content).unwrap();
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// `order-digest --config <tmp>/config.toml` with a clean environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("order-digest").unwrap();
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.temp_dir.path());
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd.arg("--config").arg(&self.config_path);
        cmd
    }
}
