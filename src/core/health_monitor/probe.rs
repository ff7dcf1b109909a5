use async_trait::async_trait;

use super::metrics::{DiskMetrics, MemoryInfo, OsInfo};

/// Trait for OS-specific fact gathering
///
/// This trait abstracts the shell- and file-based probes that differ per
/// operating system. Implementations are provided in the platform layer.
///
/// Every method is infallible from the caller's point of view: a missing
/// tool, a timeout or unparsable output degrades to an empty value.
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    /// Short identifier of the probe family (`linux`, `macos`, `windows`)
    fn name(&self) -> &'static str;

    /// Mounted filesystems, GB-normalized. Unparsable lines are dropped.
    async fn disk_usage(&self) -> Vec<DiskMetrics>;

    /// Recent CPU utilization in percent, or `None` to fall back to the
    /// process-based calculation
    async fn cpu_info(&self) -> Option<f64>;

    /// System memory in MB, or `None` to fall back to runtime figures
    async fn memory_info(&self) -> Option<MemoryInfo>;

    /// Display adapter names
    async fn gpu_info(&self) -> Vec<String>;

    /// Best-effort OS identity, empty on failure
    async fn os_info(&self) -> OsInfo;
}
