use std::sync::atomic::Ordering;
use std::time::Duration;

use healthmon::core::health_monitor::{AlertLevel, AlertType, HealthMonitor, Status};

use super::support::{config, fake_builder, monitor, FakeProbe};

const INTERVAL: Duration = Duration::from_secs(4);

#[tokio::test(start_paused = true)]
async fn test_start_twice_runs_one_schedule() {
    let probe = FakeProbe::new(40);
    let calls = probe.disk_calls.clone();
    let monitor = HealthMonitor::with_builder(&config(None), fake_builder(probe));

    monitor.start(INTERVAL).unwrap();
    monitor.start(INTERVAL).unwrap();
    assert!(monitor.is_running());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.health_history(10).len(), 1);

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(monitor.health_history(10).len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_then_start_resumes() {
    let monitor = monitor(40, None);

    monitor.start(INTERVAL).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.health_history(10).len(), 1);

    monitor.stop();
    monitor.stop();
    assert!(!monitor.is_running());

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(monitor.health_history(10).len(), 1);

    monitor.start(INTERVAL).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.health_history(10).len(), 2);

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_slow_ticks_never_overlap() {
    let probe = FakeProbe::new(40).with_delay(Duration::from_millis(300));
    let calls = probe.disk_calls.clone();
    let max_in_flight = probe.max_in_flight.clone();
    let monitor = HealthMonitor::with_builder(&config(None), fake_builder(probe));

    monitor.start(Duration::from_millis(100)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Manual collections race the scheduled ticks
    tokio::join!(monitor.collect_now(), monitor.collect_now());
    tokio::time::sleep(Duration::from_secs(2)).await;
    monitor.stop();

    let calls = calls.load(Ordering::SeqCst);
    assert!(calls >= 4, "only {} collections ran", calls);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert!(monitor.health_history(100).len() <= calls);
}

#[tokio::test(start_paused = true)]
async fn test_stop_discards_tick_in_flight() {
    let probe = FakeProbe::new(95).with_delay(Duration::from_millis(300));
    let calls = probe.disk_calls.clone();
    let monitor = HealthMonitor::with_builder(&config(None), fake_builder(probe));

    monitor.start(INTERVAL).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    monitor.stop();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(monitor.health_history(10).is_empty());
    assert!(monitor.active_alerts().is_empty());
    assert_eq!(monitor.current_health().status, Status::Unknown);

    let restarted_at = chrono::Utc::now();
    monitor.start(INTERVAL).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    monitor.stop();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let history = monitor.health_history(10);
    assert_eq!(history.len(), 1);
    assert!(history[0].timestamp >= restarted_at);
    assert_eq!(monitor.current_health().status, Status::Critical);
}

#[tokio::test]
async fn test_zero_interval_rejected() {
    let monitor = monitor(40, None);
    assert!(monitor.start(Duration::ZERO).is_err());
    assert!(!monitor.is_running());
}

#[tokio::test]
async fn test_unknown_before_first_tick() {
    let monitor = monitor(40, None);

    let health = monitor.current_health();
    assert_eq!(health.status, Status::Unknown);
    assert_eq!(health.message.as_deref(), Some("No health data available"));
    assert!(health.sample.is_none());
    assert!(monitor.health_history(50).is_empty());
    assert!(monitor.active_alerts().is_empty());
}

#[tokio::test]
async fn test_healthy_sample() {
    let monitor = monitor(40, None);
    let (sample, alerts) = monitor.collect_now().await;

    assert!(alerts.is_empty());
    assert_eq!(sample.memory.usage_percent, Some(40.0));
    assert_eq!(sample.system.cpu_percent, Some(12.5));
    assert_eq!(sample.system.uptime_formatted, "0d 2h 0m");
    assert_eq!(sample.process.pid, 4242);

    let health = monitor.current_health();
    assert_eq!(health.status, Status::Healthy);
    assert_eq!(health.last_update, Some(sample.timestamp));
    assert_eq!(health.sample, Some(sample));
}

#[tokio::test]
async fn test_high_system_memory_is_critical() {
    let monitor = monitor(95, None);
    monitor.collect_now().await;

    let health = monitor.current_health();
    assert_eq!(health.status, Status::Critical);

    let alerts = monitor.active_alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].alert_type, AlertType::Memory);
    assert_eq!(alerts[0].level, AlertLevel::Warning);
    assert_eq!(alerts[1].alert_type, AlertType::SystemMemory);
    assert_eq!(alerts[1].level, AlertLevel::Critical);
    assert_eq!(alerts[1].message, "Critical system memory usage: 95.0%");
    assert!(health
        .issues
        .contains(&"Critical system memory usage: 95.0%".to_string()));
}

#[tokio::test]
async fn test_history_is_bounded_and_chronological() {
    let mut config = config(None);
    config.history_capacity = 3;
    let monitor = HealthMonitor::with_builder(&config, fake_builder(FakeProbe::new(40)));

    let mut timestamps = Vec::new();
    for _ in 0..5 {
        let (sample, _) = monitor.collect_now().await;
        timestamps.push(sample.timestamp);
    }

    let history = monitor.health_history(10);
    assert_eq!(history.len(), 3);
    let kept: Vec<_> = history.iter().map(|s| s.timestamp).collect();
    assert_eq!(kept, timestamps[2..].to_vec());

    assert_eq!(monitor.health_history(1)[0].timestamp, timestamps[4]);
    assert!(monitor.health_history(0).is_empty());
    assert!(monitor.health_history(-1).is_empty());
}
