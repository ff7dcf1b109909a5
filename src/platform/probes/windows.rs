//! Windows probe built on `wmic` queries.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::core::health_monitor::{DiskMetrics, MemoryInfo, OsInfo, PlatformProbe};

use super::command::{bytes_to_gb, run_command};

pub struct WindowsProbe {
    timeout: Duration,
}

impl WindowsProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn wmic(&self, args: &[&str]) -> Option<String> {
        match run_command("wmic", args, self.timeout).await {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                debug!("windows probe: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PlatformProbe for WindowsProbe {
    fn name(&self) -> &'static str {
        "windows"
    }

    async fn disk_usage(&self) -> Vec<DiskMetrics> {
        self.wmic(&["logicaldisk", "get", "size,freespace,caption"])
            .await
            .map(|stdout| parse_logicaldisk(&stdout))
            .unwrap_or_default()
    }

    async fn cpu_info(&self) -> Option<f64> {
        let stdout = self.wmic(&["cpu", "get", "loadpercentage"]).await?;
        parse_load_percentage(&stdout)
    }

    async fn memory_info(&self) -> Option<MemoryInfo> {
        let stdout = self
            .wmic(&["OS", "get", "FreePhysicalMemory,TotalVisibleMemorySize"])
            .await?;
        parse_os_memory(&stdout)
    }

    async fn gpu_info(&self) -> Vec<String> {
        self.wmic(&["path", "win32_videocontroller", "get", "name"])
            .await
            .map(|stdout| data_rows(&stdout).map(str::to_string).collect())
            .unwrap_or_default()
    }

    async fn os_info(&self) -> OsInfo {
        let mut info = OsInfo::new();
        if let Some(stdout) = self.wmic(&["os", "get", "Caption,Version"]).await {
            if let Some(row) = data_rows(&stdout).next() {
                let raw = row.split_whitespace().collect::<Vec<_>>().join(" ");
                info.insert("raw".to_string(), raw);
            }
        }
        info
    }
}

/// Non-empty rows after the header. `wmic` pads with spaces and ends lines
/// with `\r\r\n`.
fn data_rows(stdout: &str) -> impl Iterator<Item = &str> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// `Caption FreeSpace Size`, values in bytes. Drives without media report
/// only a caption and are skipped.
pub fn parse_logicaldisk(stdout: &str) -> Vec<DiskMetrics> {
    data_rows(stdout)
        .filter_map(|row| {
            let parts: Vec<&str> = row.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let free: u64 = parts[1].parse().ok()?;
            let size: u64 = parts[2].parse().ok()?;
            let used = size.saturating_sub(free);
            let usage_percent = (size > 0)
                .then(|| ((used as f64 / size as f64) * 100.0).round().min(100.0) as u32);

            Some(DiskMetrics {
                mount: parts[0].to_string(),
                total_gb: bytes_to_gb(size),
                used_gb: bytes_to_gb(used),
                available_gb: bytes_to_gb(free),
                usage_percent,
            })
        })
        .collect()
}

/// One row per socket; averaged
pub fn parse_load_percentage(stdout: &str) -> Option<f64> {
    let loads: Vec<f64> = data_rows(stdout)
        .filter_map(|row| row.parse::<f64>().ok())
        .collect();
    if loads.is_empty() {
        return None;
    }
    Some(loads.iter().sum::<f64>() / loads.len() as f64)
}

/// `FreePhysicalMemory TotalVisibleMemorySize`, both in KB
pub fn parse_os_memory(stdout: &str) -> Option<MemoryInfo> {
    let row = data_rows(stdout).next()?;
    let mut values = row.split_whitespace().map(|value| value.parse::<u64>());
    let free_kb = values.next()?.ok()?;
    let total_kb = values.next()?.ok()?;

    let total_mb = total_kb / 1024;
    let free_mb = free_kb / 1024;
    Some(MemoryInfo {
        total_mb,
        free_mb,
        used_mb: total_mb.saturating_sub(free_mb),
        available_mb: None,
    })
}
