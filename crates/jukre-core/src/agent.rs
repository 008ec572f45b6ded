//! Core scheduler loop
//!
//! The Agent is responsible for:
//! - Reloading configuration on every tick (hot reload)
//! - Probing API reachability and requesting DDNS updates
//! - Journaling every outcome as an event record
//! - Waiting out the poll interval with cancellable sleep
//!
//! ## Tick flow
//!
//! ```text
//! ┌──────────────┐      ┌───────────┐      ┌──────────────┐
//! │ ConfigStore  │────▶ │   Agent   │────▶ │   EventLog   │
//! │ (reload)     │      │  (tick)   │      │  (append)    │
//! └──────────────┘      └───────────┘      └──────────────┘
//!                             │
//!                             ▼
//!                       ┌───────────┐
//!                       │ ApiProbe  │
//!                       │ ping /    │
//!                       │ update    │
//!                       └───────────┘
//! ```
//!
//! ## Lifecycle
//!
//! `Stopped → Running → StopPending → Stopped`. A stop signal observed
//! during the interval wait ends the loop immediately; one observed during
//! a tick takes effect as soon as the tick reaches the wait. The
//! `service_start`/`service_stop` bracket records written at the
//! transitions are the sole basis for uptime computation.
//!
//! ## Failure semantics
//!
//! Nothing inside a tick is retried and nothing inside a tick can
//! terminate the loop. A failed probe is recorded as a failed event; a
//! failed journal append is logged and skipped. Transient faults heal on
//! the next scheduled tick. Only an explicit stop signal ends the loop.

use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::config::{AgentConfig, ConfigStore, DEFAULT_INTERVAL_SECONDS, Paths};
use crate::error::Result;
use crate::journal::{EventLog, EventRecord};
use crate::traits::ApiProbe;

/// The periodic check/update agent
///
/// Owns the journal handle: this is the single writer to the event log.
/// Control and status invocations only ever read it.
pub struct Agent {
    config: ConfigStore,
    log: EventLog,
    probe: Box<dyn ApiProbe>,
}

impl Agent {
    /// Create an agent over the standard filesystem layout
    pub fn new(paths: &Paths, probe: Box<dyn ApiProbe>) -> Self {
        Self::with_parts(
            ConfigStore::new(paths.config_path()),
            EventLog::new(paths.log_path()),
            probe,
        )
    }

    /// Create an agent from explicit parts (tests, custom layouts)
    pub fn with_parts(config: ConfigStore, log: EventLog, probe: Box<dyn ApiProbe>) -> Self {
        Self { config, log, probe }
    }

    /// Run the agent until SIGTERM/SIGINT
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the agent with a programmatic stop signal
    ///
    /// **TESTING ONLY**: contract tests require controlled shutdown.
    /// Production code should use [`Agent::run`], which manages shutdown
    /// via OS signals.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.append_or_log(&EventRecord::service_start()).await;
        info!("Agent entering running state");

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for the provided shutdown signal
            loop {
                let interval = self.tick().await;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut rx => {
                        info!("Stop signal received");
                        break;
                    }
                }
            }
        } else {
            self.run_until_signal().await?;
        }

        self.append_or_log(&EventRecord::service_stop()).await;
        info!("Agent stopped");
        Ok(())
    }

    /// Production mode: tick until SIGTERM/SIGINT
    #[cfg(unix)]
    async fn run_until_signal(&self) -> Result<()> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| crate::error::Error::Other(format!("SIGTERM handler: {}", e)))?;
        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| crate::error::Error::Other(format!("SIGINT handler: {}", e)))?;

        loop {
            let interval = self.tick().await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = sigterm.recv() => {
                    info!("SIGTERM received");
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Fallback for non-Unix platforms: CTRL-C only
    #[cfg(not(unix))]
    async fn run_until_signal(&self) -> Result<()> {
        loop {
            let interval = self.tick().await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("CTRL-C received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Execute one tick and return the interval to wait afterward
    ///
    /// Ping first, then the update attempt. With no configured token the
    /// update is skipped without touching the network, but an explicit
    /// `update` record with `reason: "missing token"` is still journaled.
    async fn tick(&self) -> Duration {
        let config = self.config.load(&self.log).await;

        let ping = self.probe.ping().await;
        debug!(ok = ping.ok, status = ?ping.status_code, "Ping probe completed");
        self.append_or_log(&ping.into_ping_record()).await;

        match config.trimmed_token() {
            Some(token) => {
                let update = self.probe.request_update(token).await;
                debug!(ok = update.ok, detail = ?update.detail, "Update probe completed");
                self.append_or_log(&update.into_update_record()).await;
            }
            None => {
                debug!("No token configured, skipping update call");
                self.append_or_log(&EventRecord::update_skipped("missing token"))
                    .await;
            }
        }

        Duration::from_secs(effective_interval(&config))
    }

    async fn append_or_log(&self, record: &EventRecord) {
        if let Err(e) = self.log.append(record).await {
            // Journal trouble must not take the loop down.
            error!("Failed to append {} record: {}", record.kind, e);
        }
    }
}

/// Interval to wait between ticks; a zero from a hand-edited config falls
/// back to the default rather than busy-looping
fn effective_interval(config: &AgentConfig) -> u64 {
    if config.interval_seconds == 0 {
        DEFAULT_INTERVAL_SECONDS
    } else {
        config.interval_seconds
    }
}
