use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cleanmails_core::{ResubmitPolicy, SessionPolicy};
use cleanmails_engine::{ApiSettings, EngineConfig};
use cleanmails_logging::{clean_debug, clean_info};
use serde::{Deserialize, Serialize};

pub const TOKEN_ENV: &str = "CLEANMAILS_API_TOKEN";
pub const URL_ENV: &str = "CLEANMAILS_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResubmitSetting {
    #[default]
    TwoWay,
    ThreeWay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub results_limit: u32,
    pub page_size: usize,
    pub resubmit_policy: ResubmitSetting,
    pub preflight_network_check: bool,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_token: None,
            poll_interval_ms: 2000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            results_limit: 100_000,
            page_size: 50,
            resubmit_policy: ResubmitSetting::TwoWay,
            preflight_network_check: true,
            output_dir: PathBuf::from("./exports"),
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                clean_debug!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        clean_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Applies environment overrides; `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|value| !value.trim().is_empty()) {
            self.api_token = Some(token);
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: ApiSettings {
                base_url: self.api_base_url.clone(),
                token: self.api_token.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            page_size: self.page_size.max(1),
            results_limit: self.results_limit,
            resubmit: match self.resubmit_policy {
                ResubmitSetting::TwoWay => ResubmitPolicy::TwoWay,
                ResubmitSetting::ThreeWay => ResubmitPolicy::ThreeWay,
            },
            preflight_network_check: self.preflight_network_check,
        }
    }
}
