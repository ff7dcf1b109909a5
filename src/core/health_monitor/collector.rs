//! Collection loop and monitor lifecycle.
//!
//! [`HealthMonitor`] owns the sample history and the active alert set. A
//! single background task drives ticks on a Tokio interval; every tick runs
//! under the builder lock, so two collection cycles never overlap, even
//! across a `stop()`/`start()` pair. Readers get clones taken under a read
//! lock, and a tick commits its sample and alerts under one write lock.
//!
//! A tick that is still in flight when `stop()` is called finishes building
//! but its sample is discarded: nothing is committed after a stop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::platform::probes::get_platform_probe;

use super::alerts::{evaluate_alerts, Alert, AlertLevel, AlertThresholds};
use super::builder::SampleBuilder;
use super::history::HistoryStore;
use super::log_sink::HealthLog;
use super::metrics::Sample;
use super::status::{summarize, HealthStatus};

/// Slack on top of the command timeout before a probe call is abandoned
const PROBE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct MonitorState {
    history: HistoryStore,
    alerts: Vec<Alert>,
}

/// Everything a tick needs, shared between the monitor and its worker task
#[derive(Clone)]
struct TickContext {
    builder: Arc<tokio::sync::Mutex<SampleBuilder>>,
    state: Arc<RwLock<MonitorState>>,
    log: Option<Arc<HealthLog>>,
    thresholds: AlertThresholds,
}

impl TickContext {
    /// Run one collection cycle. Returns `None` when `stop` was raised while
    /// the sample was being built.
    async fn tick(&self, stop: Option<&watch::Receiver<bool>>) -> Option<(Sample, Vec<Alert>)> {
        let mut builder = self.builder.lock().await;
        let sample = builder.build().await;

        if stop.is_some_and(|stop| *stop.borrow()) {
            debug!("Monitor stopped during collection, discarding sample");
            return None;
        }

        let alerts = evaluate_alerts(&sample, &self.thresholds);
        {
            let mut state = self.state.write();
            state.history.append(sample.clone());
            state.alerts = alerts.clone();
        }

        debug!(
            "Collected sample at {} ({} alerts)",
            sample.timestamp,
            alerts.len()
        );

        if alerts.iter().any(|alert| alert.level == AlertLevel::Critical) {
            warn!("Critical system alert: {:?}", alerts);
        }

        if let Some(log) = &self.log {
            if let Err(e) = log.record(&sample, &alerts).await {
                warn!("Failed to write health log: {}", e);
            }
            if let Err(e) = log.record_critical(sample.timestamp, &alerts).await {
                warn!("Failed to write critical alert: {}", e);
            }
        }

        Some((sample, alerts))
    }
}

struct Worker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Periodic health collector with bounded history
pub struct HealthMonitor {
    ctx: TickContext,
    log_dir: PathBuf,
    worker: Mutex<Option<Worker>>,
}

#[derive(Debug, Serialize)]
struct HealthExport {
    export_timestamp: chrono::DateTime<Utc>,
    current_health: HealthStatus,
    history: Vec<Sample>,
    alerts: Vec<Alert>,
}

impl HealthMonitor {
    /// Monitor using the probe for the running OS
    pub fn new(config: &MonitorConfig) -> Self {
        let probe = get_platform_probe(config.probe_timeout());
        let builder = SampleBuilder::new(probe)
            .probe_timeout(config.probe_timeout() + PROBE_GRACE)
            .cpu_window(config.cpu_sample_window());
        Self::with_builder(config, builder)
    }

    /// Monitor driven by a caller-supplied builder
    pub fn with_builder(config: &MonitorConfig, builder: SampleBuilder) -> Self {
        let log = config
            .log_enabled
            .then(|| Arc::new(HealthLog::new(config.log_dir.clone())));

        Self {
            ctx: TickContext {
                builder: Arc::new(tokio::sync::Mutex::new(builder)),
                state: Arc::new(RwLock::new(MonitorState {
                    history: HistoryStore::with_capacity(config.history_capacity),
                    alerts: Vec::new(),
                })),
                log,
                thresholds: config.thresholds.clone(),
            },
            log_dir: config.log_dir.clone(),
            worker: Mutex::new(None),
        }
    }

    /// Collect immediately, then every `interval` until [`stop`](Self::stop).
    ///
    /// Does nothing if already running. Fails only when the timer cannot be
    /// armed: no Tokio runtime, or a zero interval.
    pub fn start(&self, interval: Duration) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            debug!("Health monitoring already running");
            return Ok(());
        }

        if interval.is_zero() {
            return Err(MonitorError::scheduler(
                "collection interval must be greater than zero",
            ));
        }
        let runtime = Handle::try_current()
            .map_err(|e| MonitorError::scheduler(format!("no async runtime available: {}", e)))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(collection_loop(self.ctx.clone(), interval, shutdown_rx));

        *worker = Some(Worker {
            shutdown: shutdown_tx,
            handle,
        });
        info!("Continuous health monitoring started (every {:?})", interval);
        Ok(())
    }

    /// Cancel the recurring collection. Safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(worker) = self.worker.lock().take() {
            // The worker may already be gone; nothing to signal then
            let _ = worker.shutdown.send(true);
            info!("Continuous health monitoring stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Run one collection cycle now, outside the schedule
    pub async fn collect_now(&self) -> (Sample, Vec<Alert>) {
        self.ctx.tick(None).await.unwrap_or_default()
    }

    pub fn current_health(&self) -> HealthStatus {
        let state = self.ctx.state.read();
        summarize(state.history.latest(), &state.alerts)
    }

    pub fn health_history(&self, limit: i64) -> Vec<Sample> {
        self.ctx.state.read().history.tail(limit)
    }

    pub fn active_alerts(&self) -> Vec<Alert> {
        self.ctx.state.read().alerts.clone()
    }

    /// Write health, full history and alerts as pretty JSON into the log
    /// directory and return the file path.
    pub async fn export_health_data(&self, filename: Option<&str>) -> Result<PathBuf> {
        let filename = match filename {
            Some(name) => {
                validate_export_name(name)?;
                name.to_string()
            }
            None => format!("health-export-{}.json", Utc::now().timestamp_millis()),
        };

        let export = {
            let state = self.ctx.state.read();
            HealthExport {
                export_timestamp: Utc::now(),
                current_health: summarize(state.history.latest(), &state.alerts),
                history: state.history.iter().cloned().collect(),
                alerts: state.alerts.clone(),
            }
        };

        let path = self.log_dir.join(filename);
        let json = serde_json::to_string_pretty(&export)?;

        tokio::fs::create_dir_all(&self.log_dir)
            .await
            .map_err(|e| MonitorError::export(format!("{:?}: {}", self.log_dir, e)))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| MonitorError::export(format!("{:?}: {}", path, e)))?;

        info!("Health data exported to {:?}", path);
        Ok(path)
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn collection_loop(
    ctx: TickContext,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    // A slow tick delays the next one instead of stacking them up
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if ctx.tick(Some(&shutdown)).await.is_none() {
                    break;
                }
            }
            _ = shutdown.changed() => {
                break;
            }
        }
    }

    debug!("Collection loop exited");
}

fn validate_export_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(MonitorError::export(format!(
            "invalid export file name: {:?}",
            name
        )));
    }
    Ok(())
}
