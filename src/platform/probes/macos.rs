//! macOS probe. CPU and memory have no cheap shell source here and are left
//! to the process-based fallback.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::core::health_monitor::{DiskMetrics, MemoryInfo, OsInfo, PlatformProbe};

use super::command::{kb_to_gb, run_command};

pub struct MacProbe {
    timeout: Duration,
}

impl MacProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        match run_command(program, args, self.timeout).await {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                debug!("macos probe: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PlatformProbe for MacProbe {
    fn name(&self) -> &'static str {
        "macos"
    }

    async fn disk_usage(&self) -> Vec<DiskMetrics> {
        self.run("df", &["-kP"])
            .await
            .map(|stdout| parse_posix_df(&stdout))
            .unwrap_or_default()
    }

    async fn cpu_info(&self) -> Option<f64> {
        None
    }

    async fn memory_info(&self) -> Option<MemoryInfo> {
        None
    }

    async fn gpu_info(&self) -> Vec<String> {
        self.run("system_profiler", &["SPDisplaysDataType"])
            .await
            .map(|stdout| parse_display_profile(&stdout))
            .unwrap_or_default()
    }

    async fn os_info(&self) -> OsInfo {
        self.run("sw_vers", &[])
            .await
            .map(|stdout| parse_sw_vers(&stdout))
            .unwrap_or_default()
    }
}

/// `df -kP`. Both the filesystem and the mount point may contain spaces, so
/// the row is anchored on the capacity column.
pub fn parse_posix_df(stdout: &str) -> Vec<DiskMetrics> {
    stdout.lines().skip(1).filter_map(parse_posix_df_line).collect()
}

fn parse_posix_df_line(line: &str) -> Option<DiskMetrics> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let capacity = (4..parts.len().saturating_sub(1)).find(|&i| {
        parts[i].ends_with('%')
            && parts[i - 3..i]
                .iter()
                .all(|value| value.parse::<u64>().is_ok())
    })?;

    let size: u64 = parts[capacity - 3].parse().ok()?;
    let used: u64 = parts[capacity - 2].parse().ok()?;
    let avail: u64 = parts[capacity - 1].parse().ok()?;
    let percent: u32 = parts[capacity].trim_end_matches('%').parse().ok()?;

    // autofs maps and other sizeless pseudo filesystems
    if size == 0 {
        return None;
    }

    Some(DiskMetrics {
        mount: parts[capacity + 1..].join(" "),
        total_gb: kb_to_gb(size),
        used_gb: kb_to_gb(used),
        available_gb: kb_to_gb(avail),
        usage_percent: Some(percent.min(100)),
    })
}

/// Every `Chipset Model:` entry of `system_profiler SPDisplaysDataType`
pub fn parse_display_profile(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Chipset Model:"))
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .collect()
}

pub fn parse_sw_vers(stdout: &str) -> OsInfo {
    let mut info = OsInfo::new();
    for line in stdout.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            if !value.is_empty() {
                info.insert(key.trim().to_string(), value.to_string());
            }
        }
    }

    let raw = ["ProductName", "ProductVersion"]
        .iter()
        .filter_map(|key| info.get(*key).map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    if !raw.is_empty() {
        info.insert("raw".to_string(), raw);
    }

    info
}
