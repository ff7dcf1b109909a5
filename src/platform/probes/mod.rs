//! OS-specific fact probes.
//!
//! The probe is selected once from the running OS, and every variant is
//! compiled on every target so each parser stays testable everywhere.

mod command;
pub mod linux;
pub mod macos;
pub mod windows;

use std::sync::Arc;
use std::time::Duration;

use crate::core::health_monitor::PlatformProbe;

pub use command::run_command;
pub use linux::LinuxProbe;
pub use macos::MacProbe;
pub use windows::WindowsProbe;

/// Probe for the running OS; external commands are bounded by `timeout`
pub fn get_platform_probe(timeout: Duration) -> Arc<dyn PlatformProbe> {
    probe_for_os(std::env::consts::OS, timeout)
}

/// Unrecognized systems get the Linux probe
pub fn probe_for_os(os: &str, timeout: Duration) -> Arc<dyn PlatformProbe> {
    match os {
        "windows" => Arc::new(WindowsProbe::new(timeout)),
        "macos" => Arc::new(MacProbe::new(timeout)),
        _ => Arc::new(LinuxProbe::new(timeout)),
    }
}
