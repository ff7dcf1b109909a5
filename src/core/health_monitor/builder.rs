//! Sample assembly.
//!
//! Gathers the platform probe facts in parallel, merges them with runtime
//! introspection and produces one normalized [`Sample`] per tick.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::ui::formatters::format_uptime;

use super::introspection::{
    process_cpu_percent, HostFacts, HostIntrospector, SchedulerMetrics, SysinfoIntrospector,
    TokioSchedulerMetrics, UtilizationTracker,
};
use super::metrics::*;
use super::probe::PlatformProbe;

pub const DEFAULT_CPU_SAMPLE_WINDOW: Duration = Duration::from_millis(100);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Builds one complete sample per collection tick
pub struct SampleBuilder {
    probe: Arc<dyn PlatformProbe>,
    introspector: Box<dyn HostIntrospector>,
    scheduler: Box<dyn SchedulerMetrics>,
    utilization: UtilizationTracker,
    probe_timeout: Duration,
    cpu_window: Duration,
}

impl SampleBuilder {
    /// Builder backed by sysinfo and the current Tokio runtime
    pub fn new(probe: Arc<dyn PlatformProbe>) -> Self {
        Self::with_sources(
            probe,
            Box::new(SysinfoIntrospector::new()),
            Box::new(TokioSchedulerMetrics::current()),
        )
    }

    pub fn with_sources(
        probe: Arc<dyn PlatformProbe>,
        introspector: Box<dyn HostIntrospector>,
        scheduler: Box<dyn SchedulerMetrics>,
    ) -> Self {
        Self {
            probe,
            introspector,
            scheduler,
            utilization: UtilizationTracker::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            cpu_window: DEFAULT_CPU_SAMPLE_WINDOW,
        }
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window = window;
        self
    }

    /// Collect one sample. Never fails: missing facts become empty values.
    pub async fn build(&mut self) -> Sample {
        let timestamp = Utc::now();
        let timeout = self.probe_timeout;
        let probe = Arc::clone(&self.probe);

        let (disk, cpu, memory_info, gpu, os_info) = tokio::join!(
            guarded("disk", timeout, probe.disk_usage()),
            guarded("cpu", timeout, probe.cpu_info()),
            guarded("memory", timeout, probe.memory_info()),
            guarded("gpu", timeout, probe.gpu_info()),
            guarded("os", timeout, probe.os_info()),
        );

        let host = self.introspector.host();
        let network = self.introspector.network();

        let cpu_percent = match cpu.flatten() {
            Some(percent) => clamp_percent(round2(percent)),
            None => self.sample_process_cpu(host.cpu_count).await,
        };

        // Read after the CPU window so memory and uptime are current
        let process = self.introspector.process();
        let scheduler_utilization_percent = self.utilization.update(self.scheduler.reading());

        let process_uptime =
            chrono::Duration::milliseconds((process.uptime_secs * 1000.0) as i64);

        Sample {
            timestamp,
            process: ProcessMetrics {
                start_time: timestamp - process_uptime,
                uptime_secs: process.uptime_secs,
                uptime_formatted: format_uptime(process.uptime_secs as u64),
                pid: process.pid,
                platform: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                active_handles: self.scheduler.alive_tasks(),
                scheduler_utilization_percent,
                rss_bytes: process.rss_bytes,
                virtual_bytes: process.virtual_bytes,
            },
            memory: merge_memory(memory_info.flatten(), &host),
            system: SystemMetrics {
                uptime_secs: host.uptime_secs,
                uptime_formatted: format_uptime(host.uptime_secs),
                load_average: host.load_average,
                cpu_count: host.cpu_count,
                cpu_model: host.cpu_model,
                cpu_percent,
                hostname: host.hostname,
                os_platform: host.os_platform,
                os_release: host.os_release,
                os_info: os_info.unwrap_or_default(),
                gpu: gpu.unwrap_or_default(),
            },
            disk: sanitize_disks(disk.unwrap_or_default()),
            network,
        }
    }

    /// CPU share of this process over the sampling window.
    ///
    /// Blocks the tick for the window length.
    async fn sample_process_cpu(&mut self, cores: usize) -> Option<f64> {
        let start = Instant::now();
        let before = self.introspector.process().cpu_time?;

        tokio::time::sleep(self.cpu_window).await;

        let elapsed = start.elapsed();
        let after = self.introspector.process().cpu_time?;

        Some(process_cpu_percent(
            after.saturating_sub(before),
            elapsed,
            cores,
        ))
    }
}

/// Run a probe call under a timeout. `None` means it did not answer in time.
async fn guarded<F, T>(what: &str, timeout: Duration, call: F) -> Option<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("{} probe timed out after {:?}", what, timeout);
            None
        }
    }
}

/// Prefer the probe's figures, falling back to what the runtime reports.
fn merge_memory(info: Option<MemoryInfo>, host: &HostFacts) -> MemoryMetrics {
    let (total, free, used) = match info.filter(|info| info.total_mb > 0) {
        Some(info) => {
            // Parsed from command output; may be arbitrarily large
            let total = info.total_mb.saturating_mul(BYTES_PER_MB);
            let free = info
                .available_mb
                .unwrap_or(info.free_mb)
                .saturating_mul(BYTES_PER_MB);
            let used = info.used_mb.saturating_mul(BYTES_PER_MB).min(total);
            (total, free.min(total), used)
        }
        None => {
            let total = host.total_memory_bytes;
            let free = host.available_memory_bytes.min(total);
            (total, free, total - free)
        }
    };

    MemoryMetrics {
        system_free_bytes: free,
        system_total_bytes: total,
        system_used_bytes: used,
        usage_percent: percent_of(used, total),
    }
}

/// Drop entries a probe should never have produced and bound percentages.
fn sanitize_disks(disks: Vec<DiskMetrics>) -> Vec<DiskMetrics> {
    disks
        .into_iter()
        .filter(|disk| {
            !disk.mount.is_empty()
                && disk.total_gb.is_finite()
                && disk.used_gb.is_finite()
                && disk.available_gb.is_finite()
        })
        .map(|mut disk| {
            disk.usage_percent = disk.usage_percent.map(|p| p.min(100));
            disk
        })
        .collect()
}
