// healthmon library - public API

// Re-export error types
pub mod error;
pub use error::{MonitorError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod server;
pub mod ui;

// Re-export commonly used types
pub use core::config::MonitorConfig;
pub use core::health_monitor::{HealthMonitor, HealthStatus, Sample, Status};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
