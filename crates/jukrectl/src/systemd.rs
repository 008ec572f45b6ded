// # systemd process-lifecycle collaborator
//
// Implements the `ServiceControl` seam by shelling out to `systemctl` for
// the daemon's unit. Control commands need privilege; failures are mapped
// to control errors carrying remediation text so the operator knows
// whether to install the unit or to elevate.
//
// `query_state` never fails: an unanswerable service manager reads as
// "not running", with the `systemctl is-active` exit code preserved as
// the raw state.

use async_trait::async_trait;
use tokio::process::Command;

use jukre_core::error::{Error, Result};
use jukre_core::traits::{ServiceControl, ServiceState};

/// Unit managed by this CLI
pub const SERVICE_UNIT: &str = "jukred.service";

/// systemd-backed implementation of the lifecycle collaborator
pub struct SystemdControl {
    unit: String,
}

impl SystemdControl {
    /// Controller for the given unit name
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    async fn systemctl(&self, verb: &str) -> Result<()> {
        let output = Command::new("systemctl")
            .arg(verb)
            .arg(&self.unit)
            .output()
            .await
            .map_err(|e| {
                Error::control(
                    format!("Failed to invoke systemctl: {}", e),
                    "Verify that systemd is available on this host.",
                )
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(map_systemctl_failure(verb, &self.unit, &stderr))
    }
}

/// Translate a systemctl failure into a control error with guidance
fn map_systemctl_failure(verb: &str, unit: &str, stderr: &str) -> Error {
    let lowered = stderr.to_lowercase();

    if lowered.contains("not found") || lowered.contains("not loaded") {
        return Error::control(
            format!("Unit {} is not installed", unit),
            format!(
                "Install and enable the service first:\n  \
                 sudo systemctl enable --now {}",
                unit
            ),
        );
    }

    if lowered.contains("access denied")
        || lowered.contains("permission denied")
        || lowered.contains("authentication is required")
        || lowered.contains("interactive authentication required")
    {
        return Error::control(
            format!("Insufficient privilege to {} {}", verb, unit),
            format!("Run with elevated privilege:\n  sudo jukrectl -c {}", verb),
        );
    }

    Error::control(
        format!("systemctl {} {} failed: {}", verb, unit, stderr.trim()),
        format!("Check the unit state with: systemctl status {}", unit),
    )
}

#[async_trait]
impl ServiceControl for SystemdControl {
    async fn start(&self) -> Result<()> {
        self.systemctl("start").await
    }

    async fn stop(&self) -> Result<()> {
        self.systemctl("stop").await
    }

    async fn restart(&self) -> Result<()> {
        // Direct restart first; fall back to stop-then-start. A stop
        // failure is ignored on the fallback path since the unit may
        // simply not be running.
        if self.systemctl("restart").await.is_ok() {
            return Ok(());
        }

        let _ = self.systemctl("stop").await;
        self.systemctl("start").await
    }

    async fn query_state(&self) -> ServiceState {
        let output = Command::new("systemctl")
            .arg("is-active")
            .arg(&self.unit)
            .output()
            .await;

        match output {
            Ok(output) => ServiceState {
                running: output.status.success(),
                raw_state: output.status.code(),
            },
            Err(_) => ServiceState::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_unit_maps_to_install_guidance() {
        let err = map_systemctl_failure(
            "start",
            SERVICE_UNIT,
            "Failed to start jukred.service: Unit jukred.service not found.",
        );
        let remediation = err.remediation().unwrap();
        assert!(remediation.contains("systemctl enable"));
    }

    #[test]
    fn denied_access_maps_to_privilege_guidance() {
        let err = map_systemctl_failure(
            "stop",
            SERVICE_UNIT,
            "Access denied\nInteractive authentication required.",
        );
        let remediation = err.remediation().unwrap();
        assert!(remediation.contains("sudo jukrectl -c stop"));
    }

    #[test]
    fn other_failures_keep_the_stderr_text() {
        let err = map_systemctl_failure("start", SERVICE_UNIT, "Transaction is destructive.");
        assert!(err.to_string().contains("Transaction is destructive."));
    }
}
