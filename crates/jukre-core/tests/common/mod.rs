//! Test doubles and common utilities for contract tests
//!
//! Minimal doubles that verify behavioral contracts (call counts, outcome
//! propagation) without touching the network or a service manager.

#![allow(dead_code)]

use async_trait::async_trait;
use jukre_core::error::Result;
use jukre_core::traits::{ApiProbe, ProbeOutcome, ServiceControl, ServiceState};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A successful ping outcome with a plausible body
pub fn ok_ping_outcome() -> ProbeOutcome {
    let body = r#"{"ok":true,"client_ip":"203.0.113.7","latency_ms":8.2,"version":"2.1","time":"2025-06-01T12:00:00Z"}"#;
    ProbeOutcome {
        ok: true,
        status_code: Some(200),
        body: Some(body.to_string()),
        parsed: serde_json::from_str(body).ok(),
        detail: None,
        error: None,
    }
}

/// A successful update outcome resolving a test host
pub fn ok_update_outcome() -> ProbeOutcome {
    let body = r#"{"fqdn":"host.juk.re","ipv4":"203.0.113.7"}"#;
    ProbeOutcome {
        ok: true,
        status_code: Some(200),
        body: Some(body.to_string()),
        parsed: serde_json::from_str(body).ok(),
        detail: None,
        error: None,
    }
}

/// A declared update failure with a detail string
pub fn failed_update_outcome(detail: &str) -> ProbeOutcome {
    let body = format!(r#"{{"detail":"{}"}}"#, detail);
    ProbeOutcome {
        ok: false,
        status_code: Some(200),
        body: Some(body.clone()),
        parsed: serde_json::from_str(&body).ok(),
        detail: Some(detail.to_string()),
        error: None,
    }
}

/// A scripted probe that returns fixed outcomes and counts calls
pub struct MockProbe {
    ping_outcome: ProbeOutcome,
    update_outcome: ProbeOutcome,
    ping_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
}

impl MockProbe {
    /// Probe where both calls succeed
    pub fn healthy() -> Self {
        Self::with_outcomes(ok_ping_outcome(), ok_update_outcome())
    }

    /// Probe with explicit outcomes for each call
    pub fn with_outcomes(ping: ProbeOutcome, update: ProbeOutcome) -> Self {
        Self {
            ping_outcome: ping,
            update_outcome: update,
            ping_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counters, usable after the probe has been boxed away
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.ping_calls.clone(), self.update_calls.clone())
    }
}

#[async_trait]
impl ApiProbe for MockProbe {
    async fn ping(&self) -> ProbeOutcome {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        self.ping_outcome.clone()
    }

    async fn request_update(&self, _token: &str) -> ProbeOutcome {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.update_outcome.clone()
    }
}

/// A service manager double with a fixed answer
pub struct MockServiceControl {
    running: bool,
}

impl MockServiceControl {
    pub fn running() -> Self {
        Self { running: true }
    }

    pub fn stopped() -> Self {
        Self { running: false }
    }
}

#[async_trait]
impl ServiceControl for MockServiceControl {
    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        Ok(())
    }

    async fn query_state(&self) -> ServiceState {
        ServiceState {
            running: self.running,
            raw_state: Some(if self.running { 4 } else { 1 }),
        }
    }
}
