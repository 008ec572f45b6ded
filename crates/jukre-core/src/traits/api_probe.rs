// # API Probe Trait
//
// Defines the interface to the remote Juk.RE API.
//
// ## Purpose
//
// The agent makes exactly two kinds of outbound calls: a reachability ping
// and a DDNS update request. Both are normalized into a `ProbeOutcome`
// value; transport and protocol failures are data, never `Err`, so a hung
// or broken remote endpoint can only ever surface as a failed outcome that
// the caller records and moves past.
//
// ## Timeout discipline
//
// Implementations must bound every call with a fixed timeout (10s for the
// HTTP implementation). No retry happens inside a probe; the scheduler
// loop heals transient failures on its next tick.

use async_trait::async_trait;

use crate::journal::{EventKind, EventRecord};

/// Normalized result of one remote call
///
/// Ephemeral: outcomes are always wrapped into an [`EventRecord`] before
/// anything durable happens to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeOutcome {
    /// Whether the call counts as a success under the call's classification
    pub ok: bool,

    /// HTTP status code, absent on transport failure
    pub status_code: Option<u16>,

    /// Raw response body, when one was received
    pub body: Option<String>,

    /// Body parsed as JSON, when it parsed
    pub parsed: Option<serde_json::Value>,

    /// Declared failure detail from the update classification
    /// (token invalid, host mismatch, `HTTP <code>` fallback, ...)
    pub detail: Option<String>,

    /// Transport error text (timeout, connection failure)
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// Outcome for a call that never produced an HTTP response
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Wrap this outcome as a `ping` journal record
    pub fn into_ping_record(self) -> EventRecord {
        self.into_record(EventKind::Ping)
    }

    /// Wrap this outcome as an `update` journal record
    pub fn into_update_record(self) -> EventRecord {
        self.into_record(EventKind::Update)
    }

    fn into_record(self, kind: EventKind) -> EventRecord {
        EventRecord {
            kind,
            ok: Some(self.ok),
            status_code: self.status_code,
            // On transport failure the error text stands in for the body,
            // so failed probes stay visible in history.
            raw: self.body.or(self.error),
            parsed: self.parsed,
            ..EventRecord::bare(kind)
        }
    }
}

/// Trait for remote API probes
///
/// # Contract
///
/// - Calls never block beyond their fixed timeout.
/// - Calls never return `Err`; every failure mode is a `ProbeOutcome`.
/// - No internal retries.
#[async_trait]
pub trait ApiProbe: Send + Sync {
    /// Reachability check against the ping endpoint
    ///
    /// `ok` is true only for an HTTP 200 whose parsed body carries
    /// `ok: true`.
    async fn ping(&self) -> ProbeOutcome;

    /// DDNS update request for the given credential
    ///
    /// Success is classified by the `detail`-field heuristic: an HTTP 200
    /// body without a `detail` field is a success, anything else is a
    /// failure whose detail text is preserved verbatim.
    async fn request_update(&self, token: &str) -> ProbeOutcome;
}
