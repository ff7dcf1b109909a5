use healthmon::core::health_monitor::log_sink::read_log;
use healthmon::core::health_monitor::{
    evaluate_alerts, AlertLevel, AlertThresholds, HealthLog, Sample,
};
use healthmon::MonitorError;
use tempfile::TempDir;

use super::support::monitor;

#[tokio::test]
async fn test_tick_writes_daily_and_critical_logs() {
    let dir = TempDir::new().unwrap();
    let monitor = monitor(95, Some(dir.path()));

    let (sample, alerts) = monitor.collect_now().await;

    let log = HealthLog::new(dir.path());
    let entries = read_log(&log.daily_file(&sample.timestamp)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].metrics, sample);
    assert_eq!(entries[0].alerts, alerts);

    let critical = std::fs::read_to_string(log.critical_file()).unwrap();
    let lines: Vec<&str> = critical.lines().collect();
    assert_eq!(lines.len(), 1);
    let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(entry["alerts"][0]["level"], "critical");
    assert_eq!(entry["alerts"][0]["type"], "system_memory");
}

#[tokio::test]
async fn test_log_round_trip_keeps_unrounded_values() {
    let dir = TempDir::new().unwrap();
    let log = HealthLog::new(dir.path());

    let mut sample = Sample::default();
    sample.system.cpu_count = 1;
    sample.system.load_average = [0.011372070312500001, 2.740234375 * 1.37, 1.0 / 3.0];
    sample.memory.system_total_bytes = 16_777_216_000;
    sample.memory.system_free_bytes = 1_480_000_123;
    let alerts = evaluate_alerts(&sample, &AlertThresholds::default());
    assert!(alerts.iter().any(|a| a.value.fract() != 0.0));

    log.record(&sample, &alerts).await.unwrap();

    let entries = read_log(&log.daily_file(&sample.timestamp)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].metrics, sample);
    assert_eq!(entries[0].alerts, alerts);
}

#[tokio::test]
async fn test_healthy_tick_skips_critical_log() {
    let dir = TempDir::new().unwrap();
    let monitor = monitor(40, Some(dir.path()));

    monitor.collect_now().await;
    monitor.collect_now().await;

    let log = HealthLog::new(dir.path());
    assert!(!log.critical_file().exists());

    let history = monitor.health_history(10);
    let entries = read_log(&log.daily_file(&history[0].timestamp)).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .all(|entry| entry.alerts.iter().all(|a| a.level != AlertLevel::Critical)));
}

#[tokio::test]
async fn test_log_failure_does_not_fail_tick() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let monitor = monitor(95, Some(blocker.as_path()));
    let (_, alerts) = monitor.collect_now().await;

    assert_eq!(alerts.len(), 2);
    assert_eq!(monitor.health_history(10).len(), 1);
}

#[tokio::test]
async fn test_export_health_data() {
    let dir = TempDir::new().unwrap();
    let monitor = monitor(95, Some(dir.path()));
    monitor.collect_now().await;

    let path = monitor.export_health_data(Some("export.json")).await.unwrap();
    assert_eq!(path, dir.path().join("export.json"));

    let export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(export["export_timestamp"].is_string());
    assert_eq!(export["current_health"]["status"], "critical");
    assert_eq!(export["history"].as_array().unwrap().len(), 1);
    assert_eq!(export["alerts"].as_array().unwrap().len(), 2);

    let default_path = monitor.export_health_data(None).await.unwrap();
    let name = default_path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("health-export-") && name.ends_with(".json"));

    let escaped = monitor.export_health_data(Some("../escape.json")).await;
    assert!(matches!(escaped, Err(MonitorError::Export(_))));
}
