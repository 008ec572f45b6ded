// # Event Journal
//
// Append-only event history for the agent, one JSON object per line.
//
// ## Purpose
//
// Every check/update attempt is persisted as an immutable event record.
// "Current status" is never cached anywhere; it is derived on demand by
// scanning this journal backward (see [`reduce`]).
//
// ## Durability model
//
// - Records are appended atomically as single lines and never mutated.
// - Append order is the total order; timestamps are expected to be
//   non-decreasing but clock skew is tolerated, not corrected.
// - The active segment is size-bounded. When it grows past the threshold
//   it is rotated into a ring of retained prior segments
//   (`log.txt.1` .. `log.txt.N`); the oldest segment beyond N is dropped.
// - Rotation happens after the write, so the record that crossed the
//   threshold is never lost (it lands in segment `.1`).
//
// ## Concurrency
//
// There is exactly one writer (the scheduler loop). Readers only use
// `read_tail` and must tolerate a partially written final line, which the
// reducer does by skipping unparsable lines.

pub mod reduce;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};

use crate::error::{Error, Result};

/// Size threshold for the active segment before rotation
pub const DEFAULT_MAX_SEGMENT_BYTES: u64 = 512_000;

/// Number of retained prior segments in the rotation ring
pub const DEFAULT_RETAINED_SEGMENTS: usize = 3;

/// Kind of a journal event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Scheduler loop entered the running state
    ServiceStart,
    /// Scheduler loop left the running state
    ServiceStop,
    /// Reachability probe against the API ping endpoint
    Ping,
    /// DDNS update attempt (or explicit skip when no token is configured)
    Update,
    /// Internal failure worth surfacing in history (e.g. unreadable config)
    Error,
}

impl EventKind {
    /// Wire name of this kind, as written to the journal
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ServiceStart => "service_start",
            EventKind::ServiceStop => "service_stop",
            EventKind::Ping => "ping",
            EventKind::Update => "update",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable journal entry
///
/// Optional fields are omitted from the serialized line when absent, so
/// records stay compact and type-specific fields (`reason`, `stage`) only
/// appear on the kinds that use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// UTC timestamp at event time
    pub ts: DateTime<Utc>,

    /// Event kind
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Tri-state outcome: true/false, or absent when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,

    /// HTTP status code of the remote call, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Original response body (or transport error text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,

    /// Structured response, when the body parsed as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,

    /// Why an operation was skipped (e.g. "missing token")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Which stage produced an `error` event (e.g. "read_config")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Error text for `error` events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventRecord {
    pub(crate) fn bare(kind: EventKind) -> Self {
        Self {
            ts: Utc::now(),
            kind,
            ok: None,
            status_code: None,
            raw: None,
            parsed: None,
            reason: None,
            stage: None,
            error: None,
        }
    }

    /// Bracket record written on entry to the running state
    pub fn service_start() -> Self {
        Self::bare(EventKind::ServiceStart)
    }

    /// Bracket record written on transition out of the running state
    pub fn service_stop() -> Self {
        Self::bare(EventKind::ServiceStop)
    }

    /// Update record for a tick that skipped the network call entirely
    ///
    /// Absence of a credential is made explicit and visible in history
    /// rather than silently producing no record.
    pub fn update_skipped(reason: impl Into<String>) -> Self {
        Self {
            ok: Some(false),
            reason: Some(reason.into()),
            ..Self::bare(EventKind::Update)
        }
    }

    /// Internal failure record
    pub fn error(stage: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            stage: Some(stage.into()),
            error: Some(error.into()),
            ..Self::bare(EventKind::Error)
        }
    }
}

/// Append-only, size-bounded event log
///
/// This is an explicit handle value owned by its user (the scheduler loop
/// or a status reader); there is no global logging state. The underlying
/// file handle is acquired per call and released when the call returns.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
    max_bytes: u64,
    max_segments: usize,
}

impl EventLog {
    /// Create a log handle for the given active segment path with defaults
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_limits(path, DEFAULT_MAX_SEGMENT_BYTES, DEFAULT_RETAINED_SEGMENTS)
    }

    /// Create a log handle with explicit rotation limits
    pub fn with_limits<P: AsRef<Path>>(path: P, max_bytes: u64, max_segments: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_bytes,
            max_segments,
        }
    }

    /// Path of the active segment
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of retained segment `index` (1 = most recent prior segment)
    fn segment_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    /// Append one record as a single JSON line
    ///
    /// Writes first, then checks the rotation threshold, so the record
    /// being appended can never be dropped by a rotation.
    pub async fn append(&self, record: &EventRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::journal(format!(
                        "Failed to create journal directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let size = {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| {
                    Error::journal(format!(
                        "Failed to open journal {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;

            file.write_all(line.as_bytes()).await.map_err(|e| {
                Error::journal(format!("Failed to append to journal: {}", e))
            })?;
            file.flush().await.map_err(|e| {
                Error::journal(format!("Failed to flush journal: {}", e))
            })?;

            file.metadata()
                .await
                .map_err(|e| Error::journal(format!("Failed to stat journal: {}", e)))?
                .len()
        };

        if size > self.max_bytes {
            self.rotate().await?;
        }

        Ok(())
    }

    /// Rotate the active segment into the retained ring
    ///
    /// `log.N` is dropped, each `log.i` becomes `log.i+1`, and the active
    /// segment becomes `log.1`. A fresh active segment is created by the
    /// next append.
    async fn rotate(&self) -> Result<()> {
        let oldest = self.segment_path(self.max_segments);
        if oldest.exists() {
            fs::remove_file(&oldest).await.map_err(|e| {
                Error::journal(format!(
                    "Failed to drop oldest segment {}: {}",
                    oldest.display(),
                    e
                ))
            })?;
        }

        for index in (1..self.max_segments).rev() {
            let from = self.segment_path(index);
            if from.exists() {
                let to = self.segment_path(index + 1);
                fs::rename(&from, &to).await.map_err(|e| {
                    Error::journal(format!(
                        "Failed to rotate {} to {}: {}",
                        from.display(),
                        to.display(),
                        e
                    ))
                })?;
            }
        }

        let first = self.segment_path(1);
        fs::rename(&self.path, &first).await.map_err(|e| {
            Error::journal(format!(
                "Failed to rotate active segment to {}: {}",
                first.display(),
                e
            ))
        })?;

        tracing::debug!("Rotated journal segment: {}", self.path.display());
        Ok(())
    }

    /// Read up to `max_bytes` from the end of the active segment as lines
    ///
    /// When the segment is smaller than requested the whole segment is
    /// returned. The first returned line may be a truncated fragment of an
    /// older record; callers must tolerate it. A missing journal reads as
    /// empty, never as an error. Cross-segment reads are not supported.
    pub async fn read_tail(&self, max_bytes: u64) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut file = fs::File::open(&self.path).await.map_err(|e| {
            Error::journal(format!(
                "Failed to open journal {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let size = file
            .metadata()
            .await
            .map_err(|e| Error::journal(format!("Failed to stat journal: {}", e)))?
            .len();

        let take = size.min(max_bytes);
        file.seek(SeekFrom::Start(size - take)).await.map_err(|e| {
            Error::journal(format!("Failed to seek journal tail: {}", e))
        })?;

        let mut buf = Vec::with_capacity(take as usize);
        file.read_to_end(&mut buf).await.map_err(|e| {
            Error::journal(format!("Failed to read journal tail: {}", e))
        })?;

        // A seek into the middle of a multi-byte character must not fail
        // the whole read; lossy decoding corrupts at most the leading
        // fragment, which the reducer skips anyway.
        let text = String::from_utf8_lossy(&buf);
        Ok(text.lines().map(|l| l.to_string()).collect())
    }
}
