use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u64,
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,
    #[serde(default = "default_failure_delay_ms")]
    pub failure_delay_ms: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    #[serde(default = "default_identity_timeout_secs")]
    pub identity_timeout_secs: u64,
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_countdown_secs() -> u64 {
    23 * 60 + 45
}
fn default_success_delay_ms() -> u64 {
    2000
}
fn default_failure_delay_ms() -> u64 {
    3000
}
fn default_tick_rate_ms() -> u64 {
    250
}
fn default_identity_url() -> String {
    "http://localhost:3000/api/init".to_string()
}
fn default_identity_timeout_secs() -> u64 {
    10
}
fn default_locale() -> String {
    "en".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown_secs(),
            success_delay_ms: default_success_delay_ms(),
            failure_delay_ms: default_failure_delay_ms(),
            tick_rate_ms: default_tick_rate_ms(),
            identity_url: default_identity_url(),
            identity_timeout_secs: default_identity_timeout_secs(),
            rng_seed: None,
            locale: default_locale(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyquest")
            .join("config.toml")
    }
}
