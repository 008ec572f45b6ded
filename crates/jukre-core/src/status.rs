//! Status derivation
//!
//! Composes a single status view out of four independent sources:
//!
//! 1. the persisted configuration (token presence, no network),
//! 2. live probes against the API (ping, token validation),
//! 3. the process-lifecycle collaborator (running / stopped),
//! 4. log-derived history via the backward-scanning reducer
//!    (uptime since `service_start`, last recorded `update`).
//!
//! Every live section is individually guarded: probes return outcome
//! values instead of errors, the lifecycle query reads "not running" when
//! the service manager is unreachable, and a missing or unreadable journal
//! reduces to empty history. One failing section never suppresses the
//! others.
//!
//! Rendering is the control CLI's job; this module only derives the data.

use chrono::{DateTime, Utc};

use crate::config::{ConfigStore, Paths};
use crate::journal::reduce::{DEFAULT_SCAN_BUDGET_BYTES, latest_by_kind};
use crate::journal::{EventKind, EventLog, EventRecord};
use crate::probe::{PingBody, UpdateBody};
use crate::traits::{ApiProbe, ProbeOutcome, ServiceControl, ServiceState};

/// Uptime of the running service, anchored at the latest `service_start`
#[derive(Debug, Clone, PartialEq)]
pub struct Uptime {
    /// When the service entered the running state
    pub since: DateTime<Utc>,
    /// Whole seconds elapsed since then
    pub seconds: u64,
}

impl Uptime {
    /// Human form, e.g. `1h 1m 1s`
    pub fn formatted(&self) -> String {
        format_uptime(self.seconds)
    }
}

/// Render whole seconds as `<h>h <m>m <s>s`
pub fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// Result of the live token-validation probe
///
/// Reported independently of whether the call actually changed the DNS
/// record; an update request for an already-current address still
/// validates the credential.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenCheck {
    /// Credential accepted by the API
    pub ok: bool,
    /// Resolved FQDN on success
    pub fqdn: Option<String>,
    /// Resolved address on success
    pub ipv4: Option<String>,
    /// Declared failure detail, when the API gave one
    pub detail: Option<String>,
    /// Transport error text, when the call never completed
    pub error: Option<String>,
}

impl TokenCheck {
    fn from_outcome(outcome: ProbeOutcome) -> Self {
        let body = UpdateBody::from_outcome(&outcome).unwrap_or_default();
        Self {
            ok: outcome.ok,
            fqdn: body.fqdn,
            ipv4: body.ipv4,
            detail: outcome.detail,
            error: outcome.error,
        }
    }
}

/// The most recent `update` event found in the journal
#[derive(Debug, Clone, PartialEq)]
pub struct LastUpdate {
    /// When the attempt was journaled
    pub ts: DateTime<Utc>,
    /// Recorded outcome, if the record carried one
    pub ok: Option<bool>,
    /// FQDN from the recorded response
    pub fqdn: Option<String>,
    /// Address from the recorded response
    pub ipv4: Option<String>,
    /// Failure detail or skip reason, when present
    pub detail: Option<String>,
}

impl LastUpdate {
    fn from_record(record: &EventRecord) -> Self {
        let body = record
            .parsed
            .as_ref()
            .and_then(|v| serde_json::from_value::<UpdateBody>(v.clone()).ok())
            .unwrap_or_default();

        // Older failure records sometimes carried the detail only in the
        // raw body; fall back to it when it looks like a declared failure.
        let raw_detail = record
            .raw
            .as_ref()
            .filter(|raw| raw.contains("Host/token"))
            .cloned();

        Self {
            ts: record.ts,
            ok: record.ok,
            fqdn: body.fqdn,
            ipv4: body.ipv4,
            detail: body.detail.or_else(|| record.reason.clone()).or(raw_detail),
        }
    }
}

/// Composed status view for one status request
///
/// Derived fresh on each request, never persisted or cached.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// A (non-empty) token is present in the configuration
    pub token_configured: bool,
    /// Live reachability: the ping probe succeeded just now
    pub online: bool,
    /// Extras from the ping body, when it parsed
    pub ping: Option<PingBody>,
    /// Live process-lifecycle state
    pub service: ServiceState,
    /// Uptime, only when running and a `service_start` record was found
    pub uptime: Option<Uptime>,
    /// Live token validation, only when a token is configured
    pub token_check: Option<TokenCheck>,
    /// Most recent `update` record from history, when one was found
    pub last_update: Option<LastUpdate>,
}

/// Derive the full status view
///
/// Performs one live ping, one lifecycle query, one bounded journal scan,
/// and (when a token is configured) one live update call.
pub async fn collect(
    paths: &Paths,
    probe: &dyn ApiProbe,
    service: &dyn ServiceControl,
) -> StatusReport {
    let config = ConfigStore::new(paths.config_path()).load_readonly().await;
    let token = config.trimmed_token().map(str::to_string);

    let ping_outcome = probe.ping().await;
    let online = ping_outcome.ok;
    let ping = PingBody::from_outcome(&ping_outcome);

    let service_state = service.query_state().await;

    let log = EventLog::new(paths.log_path());
    let latest = latest_by_kind(
        &log,
        &[EventKind::Update, EventKind::Ping, EventKind::ServiceStart],
        DEFAULT_SCAN_BUDGET_BYTES,
    )
    .await;

    let uptime = if service_state.running {
        latest.get(&EventKind::ServiceStart).map(|record| {
            let seconds = (Utc::now() - record.ts).num_seconds().max(0) as u64;
            Uptime {
                since: record.ts,
                seconds,
            }
        })
    } else {
        None
    };

    let token_check = match &token {
        Some(token) => Some(TokenCheck::from_outcome(probe.request_update(token).await)),
        None => None,
    };

    let last_update = latest.get(&EventKind::Update).map(LastUpdate::from_record);

    StatusReport {
        token_configured: token.is_some(),
        online,
        ping,
        service: service_state,
        uptime,
        token_check,
        last_update,
    }
}
