//! Append-only JSON-lines log of collected samples.
//!
//! One file per UTC day (`health-YYYY-MM-DD.log`) holding a
//! `{timestamp, metrics, alerts}` line per tick, plus `critical-alerts.log`
//! for ticks that raised critical alerts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

use super::alerts::{Alert, AlertLevel};
use super::metrics::Sample;

pub const CRITICAL_ALERTS_FILE: &str = "critical-alerts.log";

/// One line of the daily health log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub metrics: Sample,
    pub alerts: Vec<Alert>,
}

/// One line of the critical alert log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalEntry {
    pub timestamp: DateTime<Utc>,
    pub alerts: Vec<Alert>,
}

pub struct HealthLog {
    dir: PathBuf,
}

impl HealthLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Daily log file for the UTC date of `timestamp`
    pub fn daily_file(&self, timestamp: &DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("health-{}.log", timestamp.format("%Y-%m-%d")))
    }

    pub fn critical_file(&self) -> PathBuf {
        self.dir.join(CRITICAL_ALERTS_FILE)
    }

    /// Append the sample and its alerts to the daily log
    pub async fn record(&self, sample: &Sample, alerts: &[Alert]) -> Result<()> {
        let entry = LogEntry {
            timestamp: sample.timestamp,
            metrics: sample.clone(),
            alerts: alerts.to_vec(),
        };
        let line = serde_json::to_string(&entry)?;
        self.append_line(&self.daily_file(&sample.timestamp), &line)
            .await
    }

    /// Append the critical subset of `alerts`, if there is one
    pub async fn record_critical(&self, timestamp: DateTime<Utc>, alerts: &[Alert]) -> Result<()> {
        let critical: Vec<Alert> = alerts
            .iter()
            .filter(|alert| alert.level == AlertLevel::Critical)
            .cloned()
            .collect();
        if critical.is_empty() {
            return Ok(());
        }

        let line = serde_json::to_string(&CriticalEntry {
            timestamp,
            alerts: critical,
        })?;
        self.append_line(&self.critical_file(), &line).await
    }

    async fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Parse one line of a daily health log
pub fn parse_log_line(line: &str) -> Result<LogEntry> {
    Ok(serde_json::from_str(line.trim_end())?)
}

/// Read every entry of a daily health log, skipping blank lines
pub async fn read_log(path: &Path) -> Result<Vec<LogEntry>> {
    let content = fs::read_to_string(path).await?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_log_line)
        .collect()
}
