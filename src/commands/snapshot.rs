use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Serialize;

use crate::core::config::MonitorConfig;
use crate::core::health_monitor::{Alert, HealthMonitor, Sample};

#[derive(Serialize)]
struct Snapshot {
    sample: Sample,
    alerts: Vec<Alert>,
}

/// One collection, printed as JSON (for scripting)
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = one_shot_config(matches.get_one::<std::path::PathBuf>("config"))?;
    let pretty = matches.get_flag("pretty");

    let runtime = super::build_runtime()?;
    let (sample, alerts) = runtime.block_on(async {
        let monitor = HealthMonitor::new(&config);
        monitor.collect_now().await
    });

    let snapshot = Snapshot { sample, alerts };
    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)
    } else {
        serde_json::to_string(&snapshot)
    }
    .context("Failed to serialize snapshot")?;

    println!("{}", json);
    Ok(())
}

/// One-shot commands never write health logs
pub(crate) fn one_shot_config(path: Option<&std::path::PathBuf>) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load(path.map(|p| p.as_path()))
        .context("Failed to load configuration")?;
    config.log_enabled = false;
    Ok(config)
}
