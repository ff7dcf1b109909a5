//! Health status read model.
//!
//! Derived on demand from the latest sample and the active alert set; never
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alerts::{highest_level, Alert, AlertLevel};
use super::metrics::Sample;

const NO_DATA_MESSAGE: &str = "No health data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Healthy => "healthy",
            Status::Warning => "warning",
            Status::Critical => "critical",
            Status::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display strings for the dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub memory: String,
    pub uptime: String,
    pub system_load: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub issues: Vec<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub alerts: Vec<Alert>,
    pub summary: Option<HealthSummary>,
    pub sample: Option<Sample>,
}

impl HealthStatus {
    /// The "no data yet" result returned before the first tick
    pub fn unknown() -> Self {
        Self {
            status: Status::Unknown,
            message: Some(NO_DATA_MESSAGE.to_string()),
            issues: Vec::new(),
            last_update: None,
            alerts: Vec::new(),
            summary: None,
            sample: None,
        }
    }
}

/// Status implied by an alert set
pub fn derive_status(alerts: &[Alert]) -> Status {
    match highest_level(alerts) {
        Some(AlertLevel::Critical) => Status::Critical,
        Some(AlertLevel::Warning) => Status::Warning,
        None => Status::Healthy,
    }
}

/// Build the health read model from the latest sample and active alerts
pub fn summarize(latest: Option<&Sample>, alerts: &[Alert]) -> HealthStatus {
    let Some(sample) = latest else {
        return HealthStatus::unknown();
    };

    HealthStatus {
        status: derive_status(alerts),
        message: None,
        issues: alerts.iter().map(|alert| alert.message.clone()).collect(),
        last_update: Some(sample.timestamp),
        alerts: alerts.to_vec(),
        summary: Some(summary_for(sample)),
        sample: Some(sample.clone()),
    }
}

fn summary_for(sample: &Sample) -> HealthSummary {
    let gib = |bytes: u64| bytes as f64 / (1024.0 * 1024.0 * 1024.0);
    let memory = match sample.memory.usage_percent {
        Some(percent) => format!(
            "{:.1}GB / {:.1}GB ({}%)",
            gib(sample.memory.system_used_bytes),
            gib(sample.memory.system_total_bytes),
            percent
        ),
        None => "N/A".to_string(),
    };

    let system_load = if sample.system.cpu_count > 0 {
        format!("{:.2}", sample.system.load_average[0])
    } else {
        "N/A".to_string()
    };

    HealthSummary {
        memory,
        uptime: sample.process.uptime_formatted.clone(),
        system_load,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::health_monitor::alerts::AlertType;

    fn alert(alert_type: AlertType, level: AlertLevel) -> Alert {
        Alert {
            alert_type,
            level,
            message: format!("{:?}", alert_type),
            value: 1.0,
        }
    }

    #[test]
    fn test_unknown_without_samples() {
        let health = summarize(None, &[alert(AlertType::Load, AlertLevel::Warning)]);
        assert_eq!(health.status, Status::Unknown);
        assert_eq!(health.message.as_deref(), Some("No health data available"));
        assert!(health.sample.is_none());
    }

    #[test]
    fn test_status_ranking() {
        assert_eq!(derive_status(&[]), Status::Healthy);
        assert_eq!(
            derive_status(&[alert(AlertType::Memory, AlertLevel::Warning)]),
            Status::Warning
        );
        assert_eq!(
            derive_status(&[
                alert(AlertType::Memory, AlertLevel::Warning),
                alert(AlertType::SystemMemory, AlertLevel::Critical),
            ]),
            Status::Critical
        );
    }

    #[test]
    fn test_summary_fields() {
        let mut sample = Sample::default();
        sample.system.cpu_count = 2;
        sample.system.load_average = [1.234, 0.0, 0.0];
        sample.process.uptime_formatted = "0d 2h 5m".to_string();

        let alerts = vec![alert(AlertType::Load, AlertLevel::Warning)];
        let health = summarize(Some(&sample), &alerts);

        assert_eq!(health.status, Status::Warning);
        assert_eq!(health.issues, vec!["Load".to_string()]);
        assert_eq!(health.last_update, Some(sample.timestamp));
        let summary = health.summary.expect("summary");
        assert_eq!(summary.system_load, "1.23");
        assert_eq!(summary.memory, "N/A");
        assert_eq!(summary.uptime, "0d 2h 5m");
    }

    #[test]
    fn test_serializes_lowercase_status() {
        let json = serde_json::to_value(HealthStatus::unknown()).unwrap();
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["message"], "No health data available");
    }
}
