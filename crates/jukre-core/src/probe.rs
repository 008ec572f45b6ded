// # HTTP API Probe
//
// reqwest-backed implementation of [`ApiProbe`] against the Juk.RE API.
//
// ## Endpoints
//
// - `GET /ping` → `{ ok, client_ip, latency_ms, version, time }`
// - `GET /v2/ddns/update?token=<token>` → `{ fqdn, ipv4 }` on success,
//   `{ detail }` on declared failure (possibly with non-200 status)
//
// ## Update classification
//
// The success heuristic is the presence/absence of a `detail` field in the
// response body. That contract is external and undocumented beyond this
// heuristic; it is preserved verbatim here rather than tightened
// (`classify_update` is the single place it lives).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::traits::{ApiProbe, ProbeOutcome};

/// Base URL of the production API
pub const DEFAULT_BASE_URL: &str = "https://api.juk.re";

/// Fixed per-call timeout
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Parsed body of a successful ping response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingBody {
    /// API-reported health flag; the ping outcome is only `ok` when this is true
    #[serde(default)]
    pub ok: bool,

    /// Caller's public address as seen by the API
    #[serde(default)]
    pub client_ip: Option<String>,

    /// Server-measured latency
    #[serde(default)]
    pub latency_ms: Option<f64>,

    /// API version string
    #[serde(default)]
    pub version: Option<String>,

    /// API clock at response time
    #[serde(default)]
    pub time: Option<String>,
}

impl PingBody {
    /// Parse the ping extras out of a probe outcome, when present
    pub fn from_outcome(outcome: &ProbeOutcome) -> Option<Self> {
        outcome
            .parsed
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Parsed body of an update response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBody {
    /// Fully qualified domain name the token resolves to
    #[serde(default)]
    pub fqdn: Option<String>,

    /// Address the record points at
    #[serde(default)]
    pub ipv4: Option<String>,

    /// Declared failure detail; absent on success
    #[serde(default)]
    pub detail: Option<String>,
}

impl UpdateBody {
    /// Parse the update fields out of a probe outcome, when present
    pub fn from_outcome(outcome: &ProbeOutcome) -> Option<Self> {
        outcome
            .parsed
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Result of classifying an update response
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateClassification {
    /// Success under the `detail`-field heuristic
    pub ok: bool,

    /// Body parsed as JSON, when it parsed
    pub parsed: Option<serde_json::Value>,

    /// Failure detail, verbatim where the API declared one
    pub detail: Option<String>,
}

/// Classify an update response by status code and body
///
/// - 200 with a JSON body lacking `detail` → success.
/// - 200 with a `detail` field → declared failure, detail passed through.
/// - Non-200 → failure; `detail` parsed out of the body when possible,
///   else the generic `"HTTP <code>"` fallback.
pub fn classify_update(status: u16, body: &str) -> UpdateClassification {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let declared_detail = parsed.as_ref().and_then(|v| v.get("detail")).map(|d| {
        d.as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| d.to_string())
    });

    if status == 200 {
        let ok = matches!(&parsed, Some(v) if v.is_object()) && declared_detail.is_none();
        UpdateClassification {
            ok,
            parsed,
            detail: declared_detail,
        }
    } else {
        UpdateClassification {
            ok: false,
            parsed,
            detail: Some(declared_detail.unwrap_or_else(|| format!("HTTP {}", status))),
        }
    }
}

/// HTTP probe against the Juk.RE API
pub struct HttpApiProbe {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiProbe {
    /// Probe against the production API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Probe against an explicit base URL (local servers in tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| Error::probe(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> ProbeOutcome {
        let response = match self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Probe transport failure for {}: {}", url, e);
                return ProbeOutcome::transport_failure(e.to_string());
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => {
                let parsed = serde_json::from_str(&body).ok();
                ProbeOutcome {
                    ok: false,
                    status_code: Some(status),
                    body: Some(body),
                    parsed,
                    detail: None,
                    error: None,
                }
            }
            Err(e) => ProbeOutcome {
                ok: false,
                status_code: Some(status),
                body: None,
                parsed: None,
                detail: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl ApiProbe for HttpApiProbe {
    async fn ping(&self) -> ProbeOutcome {
        let url = format!("{}/ping", self.base_url);
        let mut outcome = self.get(&url, &[]).await;

        outcome.ok = outcome.status_code == Some(200)
            && outcome
                .parsed
                .as_ref()
                .and_then(|v| v.get("ok"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

        outcome
    }

    async fn request_update(&self, token: &str) -> ProbeOutcome {
        let url = format!("{}/v2/ddns/update", self.base_url);
        let mut outcome = self.get(&url, &[("token", token)]).await;

        if let (Some(status), Some(body)) = (outcome.status_code, outcome.body.as_deref()) {
            let classification = classify_update(status, body);
            outcome.ok = classification.ok;
            outcome.parsed = classification.parsed;
            outcome.detail = classification.detail;
        }

        outcome
    }
}
