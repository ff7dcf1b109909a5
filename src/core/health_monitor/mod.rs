//! Health monitoring core functionality.
//!
//! This module provides the business logic for sampling host and process
//! health, keeping a bounded history, raising threshold alerts and deriving
//! an overall health status.

pub mod alerts;
mod builder;
mod collector;
mod history;
pub mod introspection;
pub mod log_sink;
mod metrics;
mod probe;
pub mod status;

pub use alerts::{evaluate_alerts, Alert, AlertLevel, AlertThresholds, AlertType};
pub use builder::{SampleBuilder, DEFAULT_CPU_SAMPLE_WINDOW, DEFAULT_PROBE_TIMEOUT};
pub use collector::HealthMonitor;
pub use history::{HistoryStore, DEFAULT_HISTORY_SIZE};
pub use introspection::{
    BusyReading, HostFacts, HostIntrospector, ProcessFacts, SchedulerMetrics,
    SysinfoIntrospector, TokioSchedulerMetrics,
};
pub use log_sink::{HealthLog, LogEntry};
pub use metrics::{
    clamp_percent, percent_of, round2, DiskMetrics, InterfaceAddress, MemoryInfo, MemoryMetrics,
    NetworkMap, OsInfo, ProcessMetrics, Sample, SystemMetrics,
};
pub use probe::PlatformProbe;
pub use status::{derive_status, summarize, HealthStatus, HealthSummary, Status};
