// Platform-specific code module

pub mod probes;

// Re-exports for cleaner imports
pub use probes::{get_platform_probe, probe_for_os};
