//! `healthmon serve`: continuous collection plus the HTTP dashboard.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use crate::core::config::MonitorConfig;
use crate::core::health_monitor::HealthMonitor;
use crate::server::{self, AppState};

/// Execute the serve command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let runtime = super::build_runtime()?;
    runtime.block_on(run(config))
}

/// Config file first, then command-line overrides
pub fn resolve_config(matches: &ArgMatches) -> Result<MonitorConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = MonitorConfig::load(path.map(PathBuf::as_path))
        .context("Failed to load configuration")?;

    if let Some(bind) = matches.get_one::<String>("bind") {
        config.bind = bind.clone();
    }
    if let Some(interval) = matches.get_one::<u64>("interval") {
        config.interval_ms = *interval;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("log-dir") {
        config.log_dir = dir.clone();
    }
    if matches.get_flag("no-log") {
        config.log_enabled = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(config: MonitorConfig) -> Result<()> {
    let monitor = Arc::new(HealthMonitor::new(&config));
    monitor
        .start(config.interval())
        .context("Failed to start health monitoring")?;

    if config.log_enabled {
        info!("Writing health logs to {:?}", config.log_dir);
    }

    let state = AppState::new(Arc::clone(&monitor), config.page_size);
    let served = server::serve(state, &config.bind, shutdown_signal()).await;

    monitor.stop();
    served.context("HTTP server failed")
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
