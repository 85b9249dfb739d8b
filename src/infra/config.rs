// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub pixela: PixelaConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Falls back to HABITGRAM_BOT_TOKEN.
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelaConfig {
    /// Base URL of the chart service.
    pub base_url: String,
    /// Service-level token used when creating remote profiles.
    /// Falls back to PIXELA_TOKEN.
    pub service_token: Option<String>,
    /// Prefix prepended to every remote username we create.
    pub username_prefix: String,
}

impl Default for PixelaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pixe.la/v1".into(),
            service_token: None,
            username_prefix: "hg-".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the SQLite database path.
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Long-poll timeout for getUpdates, in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolved bot token: config value, then HABITGRAM_BOT_TOKEN.
    pub fn bot_token(&self) -> Option<String> {
        self.telegram
            .bot_token
            .clone()
            .or_else(|| std::env::var("HABITGRAM_BOT_TOKEN").ok())
    }

    /// Resolved chart-service token: config value, then PIXELA_TOKEN.
    pub fn service_token(&self) -> Option<String> {
        self.pixela
            .service_token
            .clone()
            .or_else(|| std::env::var("PIXELA_TOKEN").ok())
    }

    /// Resolved database path: config override, then the default location.
    pub fn db_path(&self) -> std::path::PathBuf {
        match self.storage.db_path {
            Some(ref p) => std::path::PathBuf::from(p),
            None => paths::db_path(),
        }
    }
}
