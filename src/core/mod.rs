// Core business logic module

pub mod config;
pub mod health_monitor;

// Re-export commonly used items
pub use config::MonitorConfig;
pub use health_monitor::HealthMonitor;
