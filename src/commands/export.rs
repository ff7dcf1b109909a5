use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::health_monitor::HealthMonitor;

/// Collect once and write the health export into the log directory
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = super::snapshot::one_shot_config(matches.get_one::<PathBuf>("config"))?;
    if let Some(dir) = matches.get_one::<PathBuf>("log-dir") {
        config.log_dir = dir.clone();
    }
    let filename = matches.get_one::<String>("name").cloned();

    let runtime = super::build_runtime()?;
    let path = runtime.block_on(async {
        let monitor = HealthMonitor::new(&config);
        monitor.collect_now().await;
        monitor.export_health_data(filename.as_deref()).await
    })
    .context("Failed to export health data")?;

    println!("Health data exported to {}", path.display());
    Ok(())
}
