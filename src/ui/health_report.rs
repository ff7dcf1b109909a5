//! Terminal rendering of a health snapshot.

use colored::*;

use crate::core::health_monitor::{Alert, AlertLevel, HealthStatus, Sample, Status};

use super::formatters::{format_bytes, format_percent};

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

fn colored_status(status: Status) -> ColoredString {
    let label = status.as_str().to_uppercase();
    match status {
        Status::Healthy => label.bright_green().bold(),
        Status::Warning => label.yellow().bold(),
        Status::Critical => label.red().bold(),
        Status::Unknown => label.dimmed(),
    }
}

pub fn print_health_report(health: &HealthStatus) {
    println!("\n{}", "SYSTEM HEALTH".bold().bright_cyan());
    println!("{}", "=".repeat(60));
    println!("  Status: {}", colored_status(health.status));

    if let Some(message) = &health.message {
        println!("  {}", message.dimmed());
    }
    if let Some(updated) = health.last_update {
        println!("  Last update: {}", updated.to_rfc3339());
    }

    if let Some(summary) = &health.summary {
        println!("  Memory: {}", summary.memory);
        println!("  Uptime: {}", summary.uptime);
        println!("  Load: {}", summary.system_load);
    }

    if let Some(sample) = &health.sample {
        print_sample(sample);
    }

    print_alerts(&health.alerts);
    println!();
}

fn print_sample(sample: &Sample) {
    print_section_header("Process");
    println!(
        "  PID {} on {}/{}",
        sample.process.pid, sample.process.platform, sample.process.arch
    );
    println!("  Uptime: {}", sample.process.uptime_formatted);
    println!(
        "  Resident: {}  Virtual: {}",
        format_bytes(sample.process.rss_bytes),
        format_bytes(sample.process.virtual_bytes)
    );
    println!(
        "  Tasks: {}  Scheduler utilization: {:.2}%",
        sample.process.active_handles, sample.process.scheduler_utilization_percent
    );

    print_section_header("System");
    println!("  Host: {} ({} {})", sample.system.hostname, sample.system.os_platform, sample.system.os_release);
    println!("  CPU: {} x {}", sample.system.cpu_count, sample.system.cpu_model);
    println!("  CPU usage: {}", format_percent(sample.system.cpu_percent));
    let [one, five, fifteen] = sample.system.load_average;
    println!("  Load average: {:.2} {:.2} {:.2}", one, five, fifteen);
    println!(
        "  Memory: {} used of {} ({})",
        format_bytes(sample.memory.system_used_bytes),
        format_bytes(sample.memory.system_total_bytes),
        format_percent(sample.memory.usage_percent)
    );
    for gpu in &sample.system.gpu {
        println!("  GPU: {}", gpu);
    }

    if !sample.disk.is_empty() {
        print_section_header("Disks");
        for disk in &sample.disk {
            let usage = disk
                .usage_percent
                .map(|p| format!("{}%", p))
                .unwrap_or_else(|| "N/A".to_string());
            let usage = match disk.usage_percent {
                Some(p) if p >= 90 => usage.red(),
                Some(p) if p >= 75 => usage.yellow(),
                _ => usage.normal(),
            };
            println!(
                "  {:<24} {:>9.2} GB used of {:>9.2} GB  {}",
                disk.mount, disk.used_gb, disk.total_gb, usage
            );
        }
    }

    if !sample.network.is_empty() {
        print_section_header("Network");
        for (name, addresses) in &sample.network {
            for address in addresses {
                println!("  {:<12} {:<5} {}", name, address.family, address.address);
            }
        }
    }
}

fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        return;
    }

    print_section_header("Alerts");
    for alert in alerts {
        let level = match alert.level {
            AlertLevel::Critical => "CRITICAL".red().bold(),
            AlertLevel::Warning => "WARNING".yellow().bold(),
        };
        println!("  [{}] {}", level, alert.message);
    }
}
