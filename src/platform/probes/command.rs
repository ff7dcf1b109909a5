use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{MonitorError, Result};

/// Run an external command and return its stdout.
///
/// The child is killed when it outlives `timeout`. A non-zero exit status is
/// an error, whatever the command printed.
pub async fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| MonitorError::probe(format!("{} timed out after {:?}", program, timeout)))?
        .map_err(|e| MonitorError::probe(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(MonitorError::probe(format!(
            "{} exited with {}",
            program, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// KB to GB, two decimals
pub fn kb_to_gb(kb: u64) -> f64 {
    crate::core::health_monitor::round2(kb as f64 / 1024.0 / 1024.0)
}

/// Bytes to GB, two decimals
pub fn bytes_to_gb(bytes: u64) -> f64 {
    crate::core::health_monitor::round2(bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}
