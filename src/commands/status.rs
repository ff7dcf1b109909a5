use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;

use crate::core::health_monitor::HealthMonitor;
use crate::ui::print_health_report;

/// One collection, rendered as a coloured report
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::snapshot::one_shot_config(matches.get_one::<PathBuf>("config"))?;

    let runtime = super::build_runtime()?;
    let health = runtime.block_on(async {
        let monitor = HealthMonitor::new(&config);
        monitor.collect_now().await;
        monitor.current_health()
    });

    print_health_report(&health);
    Ok(())
}
