//! Deterministic stand-ins for the OS-facing sources.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use healthmon::core::config::MonitorConfig;
use healthmon::core::health_monitor::{
    BusyReading, DiskMetrics, HealthMonitor, HostFacts, HostIntrospector, MemoryInfo, NetworkMap,
    OsInfo, PlatformProbe, ProcessFacts, SampleBuilder, SchedulerMetrics,
};

pub struct FakeProbe {
    pub used_percent: u64,
    pub disk_calls: Arc<AtomicUsize>,
    /// Highest number of `disk_usage` calls running at once
    pub max_in_flight: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    delay: Duration,
}

impl FakeProbe {
    pub fn new(used_percent: u64) -> Self {
        Self {
            used_percent,
            disk_calls: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Make every `disk_usage` call take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PlatformProbe for FakeProbe {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn disk_usage(&self) -> Vec<DiskMetrics> {
        self.disk_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        vec![DiskMetrics {
            mount: "/".to_string(),
            total_gb: 100.0,
            used_gb: 25.0,
            available_gb: 75.0,
            usage_percent: Some(25),
        }]
    }

    async fn cpu_info(&self) -> Option<f64> {
        Some(12.5)
    }

    async fn memory_info(&self) -> Option<MemoryInfo> {
        let used = self.used_percent * 10;
        Some(MemoryInfo {
            total_mb: 1000,
            free_mb: 1000 - used,
            used_mb: used,
            available_mb: Some(1000 - used),
        })
    }

    async fn gpu_info(&self) -> Vec<String> {
        Vec::new()
    }

    async fn os_info(&self) -> OsInfo {
        OsInfo::from([("raw".to_string(), "FakeOS 1.0".to_string())])
    }
}

pub struct FakeHost;

impl HostIntrospector for FakeHost {
    fn host(&mut self) -> HostFacts {
        HostFacts {
            uptime_secs: 7_200,
            load_average: [0.5, 0.5, 0.5],
            cpu_count: 4,
            cpu_model: "Fake CPU".to_string(),
            hostname: "fakehost".to_string(),
            os_platform: "linux".to_string(),
            os_release: "6.0".to_string(),
            total_memory_bytes: 0,
            available_memory_bytes: 0,
        }
    }

    fn process(&mut self) -> ProcessFacts {
        ProcessFacts {
            pid: 4242,
            uptime_secs: 60.0,
            rss_bytes: 32 * 1024 * 1024,
            virtual_bytes: 256 * 1024 * 1024,
            cpu_time: None,
        }
    }

    fn network(&mut self) -> NetworkMap {
        NetworkMap::new()
    }
}

pub struct IdleScheduler;

impl SchedulerMetrics for IdleScheduler {
    fn reading(&self) -> BusyReading {
        BusyReading::default()
    }

    fn alive_tasks(&self) -> usize {
        1
    }
}

pub fn fake_builder(probe: FakeProbe) -> SampleBuilder {
    SampleBuilder::with_sources(Arc::new(probe), Box::new(FakeHost), Box::new(IdleScheduler))
        .probe_timeout(Duration::from_secs(1))
}

pub fn config(log_dir: Option<&Path>) -> MonitorConfig {
    let mut config = MonitorConfig {
        log_enabled: log_dir.is_some(),
        ..Default::default()
    };
    if let Some(dir) = log_dir {
        config.log_dir = dir.to_path_buf();
    }
    config
}

/// Monitor over fakes reporting `used_percent` system memory
pub fn monitor(used_percent: u64, log_dir: Option<&Path>) -> HealthMonitor {
    HealthMonitor::with_builder(&config(log_dir), fake_builder(FakeProbe::new(used_percent)))
}
