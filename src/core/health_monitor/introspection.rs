//! Runtime and host introspection.
//!
//! Everything the sample builder learns without a platform probe: host
//! identity and load, this process's memory and CPU time, network interfaces
//! and the async scheduler's busy time. Both seams are traits so tests can
//! drive the builder with synthetic readings.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::warn;
use once_cell::sync::OnceCell;
use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, Networks, Pid, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};
use tokio::runtime::Handle;

use super::metrics::{round2, InterfaceAddress, NetworkMap};

/// Host-wide facts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFacts {
    pub uptime_secs: u64,
    pub load_average: [f64; 3],
    pub cpu_count: usize,
    pub cpu_model: String,
    pub hostname: String,
    pub os_platform: String,
    pub os_release: String,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
}

/// Facts about the monitoring process itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessFacts {
    pub pid: u32,
    pub uptime_secs: f64,
    pub rss_bytes: u64,
    pub virtual_bytes: u64,
    /// Accumulated user + system CPU time
    pub cpu_time: Option<Duration>,
}

/// Source of host, process and network facts
pub trait HostIntrospector: Send {
    fn host(&mut self) -> HostFacts;

    fn process(&mut self) -> ProcessFacts;

    /// Interfaces with their non-loopback addresses
    fn network(&mut self) -> NetworkMap;
}

/// Cumulative busy time of the scheduler against the wall time it covered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyReading {
    pub busy: Duration,
    pub elapsed: Duration,
}

/// Source of scheduler load readings
pub trait SchedulerMetrics: Send + Sync {
    fn reading(&self) -> BusyReading;

    fn alive_tasks(&self) -> usize;
}

/// [`HostIntrospector`] backed by sysinfo
pub struct SysinfoIntrospector {
    system: System,
    networks: Networks,
    pid: Option<Pid>,
}

impl SysinfoIntrospector {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                log::warn!("Cannot resolve own pid, process metrics disabled: {}", e);
                None
            }
        };

        Self {
            system: System::new_with_specifics(refresh_kind),
            networks: Networks::new_with_refreshed_list(),
            pid,
        }
    }
}

impl Default for SysinfoIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIntrospector for SysinfoIntrospector {
    fn host(&mut self) -> HostFacts {
        self.system.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        let load = System::load_average();
        let cpus = self.system.cpus();

        HostFacts {
            uptime_secs: System::uptime(),
            load_average: [load.one, load.five, load.fifteen],
            cpu_count: cpus.len(),
            cpu_model: cpus
                .first()
                .map(|c| c.brand().trim().to_string())
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
            os_platform: std::env::consts::OS.to_string(),
            os_release: System::kernel_version().unwrap_or_default(),
            total_memory_bytes: self.system.total_memory(),
            available_memory_bytes: self.system.available_memory(),
        }
    }

    fn process(&mut self) -> ProcessFacts {
        let Some(pid) = self.pid else {
            return ProcessFacts {
                pid: std::process::id(),
                ..Default::default()
            };
        };

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        match self.system.process(pid) {
            Some(process) => ProcessFacts {
                pid: pid.as_u32(),
                uptime_secs: process.run_time() as f64,
                rss_bytes: process.memory(),
                virtual_bytes: process.virtual_memory(),
                cpu_time: Some(Duration::from_millis(process.accumulated_cpu_time())),
            },
            None => ProcessFacts {
                pid: pid.as_u32(),
                ..Default::default()
            },
        }
    }

    fn network(&mut self) -> NetworkMap {
        self.networks.refresh(true);

        external_interfaces(self.networks.iter().map(|(name, data)| {
            (
                name.clone(),
                data.mac_address().to_string(),
                data.ip_networks().iter().map(|net| net.addr).collect(),
            )
        }))
    }
}

/// Keep only non-loopback addresses and drop interfaces left without any.
pub fn external_interfaces<I>(interfaces: I) -> NetworkMap
where
    I: IntoIterator<Item = (String, String, Vec<IpAddr>)>,
{
    let mut map = NetworkMap::new();

    for (name, mac, addrs) in interfaces {
        let entries: Vec<InterfaceAddress> = addrs
            .into_iter()
            .filter(|addr| !addr.is_loopback())
            .map(|addr| InterfaceAddress {
                address: addr.to_string(),
                family: match addr {
                    IpAddr::V4(_) => "IPv4".to_string(),
                    IpAddr::V6(_) => "IPv6".to_string(),
                },
                mac: mac.clone(),
            })
            .collect();

        if !entries.is_empty() {
            map.insert(name, entries);
        }
    }

    map
}

/// [`SchedulerMetrics`] read from the Tokio runtime the monitor runs on.
///
/// The runtime handle is bound on the first reading taken inside a runtime,
/// so a monitor constructed before the runtime starts still reports.
pub struct TokioSchedulerMetrics {
    bound: OnceCell<(Handle, Instant)>,
    warned: AtomicBool,
}

impl TokioSchedulerMetrics {
    /// Bind to the current runtime now if there is one, otherwise on first use
    pub fn current() -> Self {
        let bound = OnceCell::new();
        if let Ok(handle) = Handle::try_current() {
            let _ = bound.set((handle, Instant::now()));
        }
        Self {
            bound,
            warned: AtomicBool::new(false),
        }
    }

    fn runtime(&self) -> Option<&(Handle, Instant)> {
        if let Some(bound) = self.bound.get() {
            return Some(bound);
        }
        match Handle::try_current() {
            Ok(handle) => Some(self.bound.get_or_init(|| (handle, Instant::now()))),
            Err(_) => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    warn!("No Tokio runtime; scheduler metrics report 0");
                }
                None
            }
        }
    }
}

impl SchedulerMetrics for TokioSchedulerMetrics {
    fn reading(&self) -> BusyReading {
        let Some((handle, origin)) = self.runtime() else {
            return BusyReading::default();
        };

        let metrics = handle.metrics();
        let workers = metrics.num_workers();
        let busy = (0..workers)
            .map(|worker| metrics.worker_total_busy_duration(worker))
            .sum();

        BusyReading {
            busy,
            elapsed: origin.elapsed() * workers as u32,
        }
    }

    fn alive_tasks(&self) -> usize {
        self.runtime()
            .map(|(handle, _)| handle.metrics().num_alive_tasks())
            .unwrap_or(0)
    }
}

/// Turns cumulative busy readings into per-tick utilization.
///
/// The first reading only sets the baseline and reports 0. Each later
/// reading reports the busy share since the previous one and replaces it.
#[derive(Debug, Default)]
pub struct UtilizationTracker {
    baseline: Option<BusyReading>,
}

impl UtilizationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, current: BusyReading) -> f64 {
        let percent = match self.baseline {
            None => 0.0,
            Some(previous) => {
                let busy = current.busy.saturating_sub(previous.busy);
                let elapsed = current.elapsed.saturating_sub(previous.elapsed);
                if elapsed.is_zero() {
                    0.0
                } else {
                    let fraction = (busy.as_secs_f64() / elapsed.as_secs_f64()).min(1.0);
                    round2(fraction * 100.0)
                }
            }
        };

        self.baseline = Some(current);
        percent
    }
}

/// CPU share of this process over a wall-clock window, across all cores
pub fn process_cpu_percent(cpu_time: Duration, wall: Duration, cores: usize) -> f64 {
    if wall.is_zero() || cores == 0 {
        return 0.0;
    }
    let cpu_ms = cpu_time.as_secs_f64() * 1000.0;
    let wall_ms = wall.as_secs_f64() * 1000.0;
    round2(cpu_ms / (wall_ms * cores as f64) * 100.0).clamp(0.0, 100.0)
}
