use super::{get_config_dir, Config};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Loads `config.toml` and applies environment overrides on top.
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Use `path` if given, otherwise the platform config directory.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_config_dir()?.join(CONFIG_FILE_NAME)),
        }
    }

    pub async fn load(&self) -> Result<Config> {
        let path = self.config_path()?;
        let mut config = Self::load_file(&path, self.path.is_some()).await?;
        config.merge_env_vars();
        config.api.validate()?;
        Ok(config)
    }

    /// A missing default file is not an error; a missing explicit one is.
    async fn load_file(path: &Path, required: bool) -> Result<Config> {
        if !required && !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::new());
        }

        let content = fs::read_to_string(path).await?;
        debug!("Loaded config from {}", path.display());
        Config::from_toml_str(&content)
    }
}
