// Command handlers module
pub mod export;
pub mod serve;
pub mod snapshot;
pub mod status;
pub mod version;

use anyhow::{Context, Result};

// Re-exports for cleaner imports
pub use export::execute as export;
pub use serve::execute as serve;
pub use snapshot::execute as snapshot;
pub use status::execute as status;
pub use version::execute as version;

/// Multi-threaded runtime shared by the async commands
pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("healthmon-worker")
        .build()
        .context("Failed to start async runtime")
}
