// # Status Reducer
//
// Reconstructs latest-state-per-kind from the event journal.
//
// The journal is the only durable state the agent keeps, so "what happened
// most recently" is answered by scanning it backward from the end. The scan
// is bounded (a fixed byte budget over the active segment) and terminates
// early once every wanted kind has been found, preserving the bounded-cost
// guarantee: status requests never pay for the full history.
//
// Corruption tolerance: a concurrent writer means a reader may observe a
// partially written final line, and the tail read itself may start mid-line.
// Unparsable lines are skipped silently; they never fail the reduction.

use std::collections::HashMap;

use super::{EventKind, EventLog, EventRecord};

/// Default backward-scan budget over the journal tail
pub const DEFAULT_SCAN_BUDGET_BYTES: u64 = 50_000;

/// Reduce journal lines (newest first) to the latest record per kind
///
/// - `wanted` empty: collect the most recent record of every distinct kind
///   encountered in the scanned window.
/// - `wanted` non-empty: collect only those kinds, and stop consuming lines
///   as soon as all of them have been found.
///
/// The result holds at most one record per kind: the first one seen, which
/// is the most recent because iteration is newest-first.
pub fn reduce_lines<'a, I>(newest_first: I, wanted: &[EventKind]) -> HashMap<EventKind, EventRecord>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut latest = HashMap::new();

    for line in newest_first {
        let Ok(record) = serde_json::from_str::<EventRecord>(line) else {
            continue;
        };

        if wanted.is_empty() || wanted.contains(&record.kind) {
            latest.entry(record.kind).or_insert(record);
        }

        if !wanted.is_empty() && wanted.iter().all(|kind| latest.contains_key(kind)) {
            break;
        }
    }

    latest
}

/// Scan the journal tail backward and return the latest record per kind
///
/// Reads at most `scan_budget_bytes` from the end of the active segment.
/// A kind whose true latest record lies outside the scanned window is
/// simply absent from the result; that is the bounded-cost trade-off, not
/// an error. Read failures also reduce to an empty result: status
/// derivation never fails because history is unavailable.
pub async fn latest_by_kind(
    log: &EventLog,
    wanted: &[EventKind],
    scan_budget_bytes: u64,
) -> HashMap<EventKind, EventRecord> {
    let lines = match log.read_tail(scan_budget_bytes).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!("Journal tail read failed, reducing to empty history: {}", e);
            return HashMap::new();
        }
    };

    reduce_lines(lines.iter().rev().map(|l| l.as_str()), wanted)
}
