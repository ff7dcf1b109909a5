//! Linux probe: GNU coreutils `df`, procps `top`/`free`, `lspci` and
//! `/etc/os-release`. Also the fallback for unrecognized systems.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::health_monitor::{round2, DiskMetrics, MemoryInfo, OsInfo, PlatformProbe};

use super::command::{kb_to_gb, run_command};

const OS_RELEASE: &str = "/etc/os-release";

static TOP_IDLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*id").ok());

pub struct LinuxProbe {
    timeout: Duration,
}

impl LinuxProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        match run_command(program, args, self.timeout).await {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                debug!("linux probe: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PlatformProbe for LinuxProbe {
    fn name(&self) -> &'static str {
        "linux"
    }

    async fn disk_usage(&self) -> Vec<DiskMetrics> {
        self.run(
            "df",
            &[
                "-k",
                "--output=target,size,used,avail,pcent",
                "-x",
                "tmpfs",
                "-x",
                "devtmpfs",
            ],
        )
        .await
        .map(|stdout| parse_df(&stdout))
        .unwrap_or_default()
    }

    async fn cpu_info(&self) -> Option<f64> {
        let stdout = self.run("top", &["-bn1"]).await?;
        parse_top_cpu(&stdout)
    }

    async fn memory_info(&self) -> Option<MemoryInfo> {
        let stdout = self.run("free", &["-m"]).await?;
        parse_free(&stdout)
    }

    async fn gpu_info(&self) -> Vec<String> {
        self.run("lspci", &[])
            .await
            .map(|stdout| parse_lspci(&stdout))
            .unwrap_or_default()
    }

    async fn os_info(&self) -> OsInfo {
        match tokio::fs::read_to_string(OS_RELEASE).await {
            Ok(content) => parse_os_release(&content),
            Err(e) => {
                debug!("linux probe: cannot read {}: {}", OS_RELEASE, e);
                OsInfo::new()
            }
        }
    }
}

/// `df -k --output=target,size,used,avail,pcent`. Mount points may contain
/// spaces, so the four numeric columns are taken from the right.
pub fn parse_df(stdout: &str) -> Vec<DiskMetrics> {
    stdout.lines().skip(1).filter_map(parse_df_line).collect()
}

fn parse_df_line(line: &str) -> Option<DiskMetrics> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let n = parts.len();
    let size: u64 = parts[n - 4].parse().ok()?;
    let used: u64 = parts[n - 3].parse().ok()?;
    let avail: u64 = parts[n - 2].parse().ok()?;
    let percent: u32 = parts[n - 1].trim_end_matches('%').parse().ok()?;

    Some(DiskMetrics {
        mount: parts[..n - 4].join(" "),
        total_gb: kb_to_gb(size),
        used_gb: kb_to_gb(used),
        available_gb: kb_to_gb(avail),
        usage_percent: Some(percent.min(100)),
    })
}

/// Busy share from the `%Cpu(s): ... 99.5 id, ...` summary line of `top -bn1`
pub fn parse_top_cpu(stdout: &str) -> Option<f64> {
    let line = stdout.lines().find(|line| line.contains("Cpu(s)"))?;
    let idle = TOP_IDLE.as_ref()?.captures(line)?.get(1)?.as_str().replace(',', ".");
    let idle: f64 = idle.parse().ok()?;
    Some(round2((100.0 - idle).clamp(0.0, 100.0)))
}

/// The `Mem:` row of `free -m`
pub fn parse_free(stdout: &str) -> Option<MemoryInfo> {
    let line = stdout.lines().find(|line| line.starts_with("Mem:"))?;
    let parts: Vec<&str> = line.split_whitespace().collect();

    let total: u64 = parts.get(1)?.parse().ok()?;
    let used: u64 = parts.get(2)?.parse().ok()?;
    let free: u64 = parts.get(3)?.parse().ok()?;
    let available = parts.get(6).and_then(|value| value.parse().ok());

    Some(MemoryInfo {
        total_mb: total,
        free_mb: free,
        used_mb: used,
        available_mb: available,
    })
}

/// Display controllers from `lspci`
pub fn parse_lspci(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("vga") || lower.contains("3d controller")
        })
        .map(|line| line.trim().to_string())
        .collect()
}

/// `KEY=value` pairs, quotes stripped
pub fn parse_os_release(content: &str) -> OsInfo {
    let mut info = OsInfo::new();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"');
        if !key.is_empty() && !key.starts_with('#') && !value.is_empty() {
            info.insert(key.to_string(), value.to_string());
        }
    }

    if let Some(pretty) = info.get("PRETTY_NAME").cloned() {
        info.insert("raw".to_string(), pretty);
    }

    info
}
