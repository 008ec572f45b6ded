//! Behavioral contract: the tick cycle
//!
//! Constraints verified:
//! - A tick with no configured token journals an explicit failed `update`
//!   record with `reason: "missing token"` and never calls the update
//!   endpoint
//! - A tick with a token calls the update endpoint exactly once and
//!   journals its outcome
//! - Configuration is reloaded on every tick (hot reload)
//! - A failing probe is recorded, not retried, and does not end the loop

mod common;

use common::*;
use jukre_core::config::{AgentConfig, ConfigStore};
use jukre_core::journal::reduce::{DEFAULT_SCAN_BUDGET_BYTES, latest_by_kind};
use jukre_core::journal::{EventKind, EventLog};
use jukre_core::traits::ProbeOutcome;
use jukre_core::Agent;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::tempdir;

async fn run_one_tick(agent: Agent) {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = tokio::spawn(async move { agent.run_with_shutdown(Some(shutdown_rx)).await });

    // First tick runs immediately; the default 300s interval keeps the
    // loop parked in its wait until we cancel it.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("agent terminates promptly")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn missing_token_skips_update_call_but_journals_the_skip() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("log.txt"));

    let probe = MockProbe::healthy();
    let (ping_calls, update_calls) = probe.counters();

    let agent = Agent::with_parts(
        ConfigStore::new(dir.path().join("config.json")),
        log.clone(),
        Box::new(probe),
    );
    run_one_tick(agent).await;

    assert_eq!(ping_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        update_calls.load(Ordering::SeqCst),
        0,
        "no network call may happen for the update when the token is absent"
    );

    let latest = latest_by_kind(&log, &[EventKind::Update], DEFAULT_SCAN_BUDGET_BYTES).await;
    let update = &latest[&EventKind::Update];
    assert_eq!(update.ok, Some(false));
    assert_eq!(update.reason.as_deref(), Some("missing token"));
}

#[tokio::test]
async fn configured_token_calls_update_once_and_journals_the_outcome() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&AgentConfig {
            token: "tok-123".to_string(),
            interval_seconds: 300,
        })
        .await
        .unwrap();

    let log = EventLog::new(dir.path().join("log.txt"));
    let probe = MockProbe::healthy();
    let (_, update_calls) = probe.counters();

    let agent = Agent::with_parts(store, log.clone(), Box::new(probe));
    run_one_tick(agent).await;

    assert_eq!(update_calls.load(Ordering::SeqCst), 1);

    let latest = latest_by_kind(&log, &[EventKind::Update], DEFAULT_SCAN_BUDGET_BYTES).await;
    let update = &latest[&EventKind::Update];
    assert_eq!(update.ok, Some(true));
    assert_eq!(update.status_code, Some(200));
    assert!(update.reason.is_none());
}

#[tokio::test]
async fn declared_update_failure_is_recorded_not_retried() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&AgentConfig {
            token: "bad-token".to_string(),
            interval_seconds: 300,
        })
        .await
        .unwrap();

    let log = EventLog::new(dir.path().join("log.txt"));
    let probe = MockProbe::with_outcomes(
        ok_ping_outcome(),
        failed_update_outcome("Host/token mismatch"),
    );
    let (_, update_calls) = probe.counters();

    let agent = Agent::with_parts(store, log.clone(), Box::new(probe));
    run_one_tick(agent).await;

    // One attempt, no in-tick retry.
    assert_eq!(update_calls.load(Ordering::SeqCst), 1);

    let latest = latest_by_kind(&log, &[EventKind::Update], DEFAULT_SCAN_BUDGET_BYTES).await;
    assert_eq!(latest[&EventKind::Update].ok, Some(false));
}

#[tokio::test]
async fn transport_failure_is_recorded_and_loop_survives() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&AgentConfig {
            token: String::new(),
            interval_seconds: 1,
        })
        .await
        .unwrap();

    let log = EventLog::new(dir.path().join("log.txt"));
    let probe = MockProbe::with_outcomes(
        ProbeOutcome::transport_failure("connection refused"),
        ok_update_outcome(),
    );
    let (ping_calls, _) = probe.counters();

    let agent = Agent::with_parts(store, log.clone(), Box::new(probe));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { agent.run_with_shutdown(Some(shutdown_rx)).await });

    // 1s interval: let at least two ticks happen despite the failing probe.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("agent terminates promptly")
        .unwrap()
        .unwrap();

    assert!(
        ping_calls.load(Ordering::SeqCst) >= 2,
        "failed probes self-heal via the next tick, not via in-tick retry"
    );

    let latest = latest_by_kind(&log, &[EventKind::Ping], DEFAULT_SCAN_BUDGET_BYTES).await;
    let ping = &latest[&EventKind::Ping];
    assert_eq!(ping.ok, Some(false));
    assert_eq!(ping.status_code, None);
    assert_eq!(ping.raw.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn config_is_reloaded_every_tick() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&AgentConfig {
            token: String::new(),
            interval_seconds: 1,
        })
        .await
        .unwrap();

    let log = EventLog::new(dir.path().join("log.txt"));
    let probe = MockProbe::healthy();
    let (_, update_calls) = probe.counters();

    let agent = Agent::with_parts(store.clone(), log, Box::new(probe));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { agent.run_with_shutdown(Some(shutdown_rx)).await });

    // First tick sees no token.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(update_calls.load(Ordering::SeqCst), 0);

    // Operator edits the config while the loop is running.
    store
        .save(&AgentConfig {
            token: "tok-123".to_string(),
            interval_seconds: 1,
        })
        .await
        .unwrap();

    // A later tick picks the token up without a restart.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("agent terminates promptly")
        .unwrap()
        .unwrap();

    assert!(update_calls.load(Ordering::SeqCst) >= 1);
}
