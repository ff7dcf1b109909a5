//! Alert rules for monitoring critical conditions.
//!
//! Evaluates a single sample against fixed thresholds. Nothing is remembered
//! between calls: the active alert set is recomputed from every new sample.

use serde::{Deserialize, Serialize};

use super::metrics::Sample;

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub memory_warning_percent: f64,         // memory.usage_percent (%)
    pub system_memory_critical_percent: f64, // (total - free) / total (%)
    pub load_per_cpu_warning: f64,           // 1-minute load per logical CPU
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            memory_warning_percent: 85.0,
            system_memory_critical_percent: 90.0,
            load_per_cpu_warning: 2.0,
        }
    }
}

/// An individual alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub level: AlertLevel,
    pub message: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Memory,
    SystemMemory,
    Load,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// Evaluate a sample and generate alerts, in rule order.
///
/// Every rule is checked independently; a sample can raise all three.
pub fn evaluate_alerts(sample: &Sample, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(usage) = sample.memory.usage_percent {
        if usage > thresholds.memory_warning_percent {
            alerts.push(Alert {
                alert_type: AlertType::Memory,
                level: AlertLevel::Warning,
                message: format!("High memory usage: {}%", usage),
                value: usage,
            });
        }
    }

    if let Some(usage) = system_memory_usage(sample) {
        if usage > thresholds.system_memory_critical_percent {
            alerts.push(Alert {
                alert_type: AlertType::SystemMemory,
                level: AlertLevel::Critical,
                message: format!("Critical system memory usage: {:.1}%", usage),
                value: usage,
            });
        }
    }

    let cpu_count = sample.system.cpu_count;
    let load = sample.system.load_average[0];
    if cpu_count > 0 && load > cpu_count as f64 * thresholds.load_per_cpu_warning {
        alerts.push(Alert {
            alert_type: AlertType::Load,
            level: AlertLevel::Warning,
            message: format!("High load average: {:.2}", load),
            value: load,
        });
    }

    alerts
}

/// `(total - free) / total * 100`, or `None` when the total is unknown.
pub fn system_memory_usage(sample: &Sample) -> Option<f64> {
    let total = sample.memory.system_total_bytes;
    if total == 0 {
        return None;
    }
    let free = sample.memory.system_free_bytes.min(total);
    Some((total - free) as f64 / total as f64 * 100.0)
}

/// Highest level among the alerts, if any
pub fn highest_level(alerts: &[Alert]) -> Option<AlertLevel> {
    alerts.iter().map(|alert| alert.level).max()
}
