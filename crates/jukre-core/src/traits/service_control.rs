// # Service Control Trait
//
// Interface to the host process-lifecycle collaborator.
//
// The agent itself never manages OS services; the control CLI does, via an
// implementation of this trait (systemd in production, a mock in tests).
// `query_state` is intentionally infallible: a collaborator that cannot be
// reached reads as "not running", the same way the original operator
// tooling treated an unreachable service manager.

use async_trait::async_trait;

use crate::error::Result;

/// Live process-lifecycle state of the background service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceState {
    /// Whether the service is currently running
    pub running: bool,

    /// Raw state code reported by the service manager, when it answered
    pub raw_state: Option<i32>,
}

impl ServiceState {
    /// State for a service manager that could not be queried
    pub fn unknown() -> Self {
        Self {
            running: false,
            raw_state: None,
        }
    }
}

/// Trait for process-lifecycle collaborators
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// Start the background service
    async fn start(&self) -> Result<()>;

    /// Stop the background service
    async fn stop(&self) -> Result<()>;

    /// Restart the background service
    ///
    /// Implementations should attempt a direct restart primitive first and
    /// fall back to stop-then-start if it fails.
    async fn restart(&self) -> Result<()>;

    /// Query the current lifecycle state
    async fn query_state(&self) -> ServiceState;
}
