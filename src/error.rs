use std::io;
use thiserror::Error;

/// Custom error type for the health monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for the health monitor
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        MonitorError::Scheduler(msg.into())
    }

    pub fn probe<S: Into<String>>(msg: S) -> Self {
        MonitorError::Probe(msg.into())
    }

    pub fn export<S: Into<String>>(msg: S) -> Self {
        MonitorError::Export(msg.into())
    }

    pub fn server<S: Into<String>>(msg: S) -> Self {
        MonitorError::Server(msg.into())
    }
}
