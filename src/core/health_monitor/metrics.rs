use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform key/value facts about the operating system.
///
/// Probes that only produce a display string store it under the `raw` key.
pub type OsInfo = BTreeMap<String, String>;

/// Non-internal addresses per network interface name.
pub type NetworkMap = BTreeMap<String, Vec<InterfaceAddress>>;

/// One timestamped snapshot of every collected metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub process: ProcessMetrics,
    pub memory: MemoryMetrics,
    pub system: SystemMetrics,
    pub disk: Vec<DiskMetrics>,
    pub network: NetworkMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub start_time: DateTime<Utc>,
    pub uptime_secs: f64,
    pub uptime_formatted: String,
    pub pid: u32,
    pub platform: String,
    pub arch: String,
    /// Tasks alive on the async runtime
    pub active_handles: usize,
    pub scheduler_utilization_percent: f64,
    /// Resident set size in bytes
    pub rss_bytes: u64,
    /// Reserved virtual address space in bytes
    pub virtual_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Memory still obtainable by new allocations, in bytes
    pub system_free_bytes: u64,
    pub system_total_bytes: u64,
    pub system_used_bytes: u64,
    /// `used / total`, `None` when the total is unknown
    pub usage_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub uptime_secs: u64,
    pub uptime_formatted: String,
    pub load_average: [f64; 3], // 1, 5, 15 min
    pub cpu_count: usize,
    pub cpu_model: String,
    pub cpu_percent: Option<f64>,
    pub hostname: String,
    pub os_platform: String,
    pub os_release: String,
    pub os_info: OsInfo,
    pub gpu: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    /// Mount point on Unix, drive letter on Windows
    pub mount: String,
    pub total_gb: f64,
    pub used_gb: f64,
    pub available_gb: f64,
    pub usage_percent: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub address: String,
    pub family: String,
    pub mac: String,
}

/// Memory facts reported by a platform probe, in MB
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_mb: u64,
    pub free_mb: u64,
    pub used_mb: u64,
    pub available_mb: Option<u64>,
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp a percentage into `[0, 100]`, mapping non-finite values to `None`.
pub fn clamp_percent(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value.clamp(0.0, 100.0))
    } else {
        None
    }
}

/// `part / whole * 100` rounded to two decimals, `None` for an empty whole.
pub fn percent_of(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    clamp_percent(round2(part as f64 / whole as f64 * 100.0))
}
