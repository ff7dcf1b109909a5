use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::health_monitor::AlertThresholds;
use crate::error::{MonitorError, Result};

pub const DEFAULT_INTERVAL_MS: u64 = 4000;
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Collection interval in milliseconds
    pub interval_ms: u64,
    pub history_capacity: usize,
    /// History length returned by the HTTP endpoints
    pub page_size: usize,
    /// Upper bound for a single probe command
    pub probe_timeout_ms: u64,
    /// Wall-clock window of the process CPU fallback
    pub cpu_sample_window_ms: u64,
    pub log_enabled: bool,
    pub log_dir: PathBuf,
    pub bind: String,
    pub thresholds: AlertThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
            probe_timeout_ms: 5000,
            cpu_sample_window_ms: 100,
            log_enabled: true,
            log_dir: default_log_dir(),
            bind: DEFAULT_BIND.to_string(),
            thresholds: AlertThresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// Load the configuration file, or defaults when `path` is `None` or
    /// does not exist. A file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let data = fs::read_to_string(path)?;
                if data.trim().is_empty() {
                    MonitorConfig::default()
                } else {
                    toml::from_str(&data)?
                }
            }
            Some(path) => {
                log::info!("Config file {:?} not found, using defaults", path);
                MonitorConfig::default()
            }
            None => MonitorConfig::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// `PORT` replaces the port of the bind address
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.trim().parse::<u16>() {
                let host = self
                    .bind
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "127.0.0.1".to_string());
                self.bind = format!("{}:{}", host, port);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(MonitorError::config("interval_ms must be greater than zero"));
        }
        if self.probe_timeout_ms == 0 {
            return Err(MonitorError::config(
                "probe_timeout_ms must be greater than zero",
            ));
        }
        if self.history_capacity == 0 {
            return Err(MonitorError::config(
                "history_capacity must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_window_ms)
    }
}

/// `<data dir>/healthmon/logs`, or `./logs` when no data dir is known
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("healthmon").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
