//! # Session
//!
//! Per-request state accumulated while replicas answer. A session is owned
//! by exactly one coordinator at a time and is never shared across tasks;
//! only its [`CancellationSignal`] is handed to replica calls.

use shared_types::{ErrorMessage, SessionId};
use std::collections::{BTreeMap, HashSet};
use tracing::error;

use super::cancellation::{CancelReason, CancellationSignal};

/// Status recorded for a replica call aborted by the deadline.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status recorded when a replica failed without a usable HTTP status:
/// transport errors, unparseable bodies, `success: false` on a 2xx, and key
/// version mismatches.
pub const SYNTHETIC_FAILURE_STATUS: u16 = 502;

/// One successful, schema-valid signer response.
#[derive(Debug, Clone, PartialEq)]
pub struct SignerResponseRecord<R> {
    /// Primary URL of the replica, even when the fallback answered.
    pub url: String,
    pub response: R,
    pub status: u16,
}

/// State of one client request across all replica calls.
#[derive(Debug)]
pub struct Session<R> {
    id: SessionId,
    key_version: u32,
    threshold: usize,
    total_replicas: usize,
    responses: Vec<SignerResponseRecord<R>>,
    error_codes: BTreeMap<u16, usize>,
    failed_replicas: HashSet<String>,
    warnings: Vec<String>,
    cancellation: CancellationSignal,
}

impl<R> Session<R> {
    pub fn new(threshold: usize, total_replicas: usize, key_version: u32) -> Self {
        Self::with_id(SessionId::new(), threshold, total_replicas, key_version)
    }

    pub fn with_id(id: SessionId, threshold: usize, total_replicas: usize, key_version: u32) -> Self {
        Self {
            id,
            key_version,
            threshold,
            total_replicas,
            responses: Vec::new(),
            error_codes: BTreeMap::new(),
            failed_replicas: HashSet::new(),
            warnings: Vec::new(),
            cancellation: CancellationSignal::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn key_version(&self) -> u32 {
        self.key_version
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn total_replicas(&self) -> usize {
        self.total_replicas
    }

    pub fn responses(&self) -> &[SignerResponseRecord<R>] {
        &self.responses
    }

    /// Response recorded for the replica with this primary URL.
    pub fn response_for(&self, url: &str) -> Option<&R> {
        self.responses
            .iter()
            .find(|r| r.url == url)
            .map(|r| &r.response)
    }

    /// Error status counts, ascending by status.
    pub fn error_codes(&self) -> &BTreeMap<u16, usize> {
        &self.error_codes
    }

    pub fn failed_replicas(&self) -> &HashSet<String> {
        &self.failed_replicas
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = String>) {
        self.warnings.extend(warnings);
    }

    /// Signal handed to replica calls.
    pub fn cancellation(&self) -> &CancellationSignal {
        &self.cancellation
    }

    /// Fire cancellation. Returns `false` if it had already fired.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        self.cancellation.cancel(reason)
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancellation.reason()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Whether the deadline, rather than a decision, stopped the dispatch.
    pub fn timed_out(&self) -> bool {
        self.cancel_reason() == Some(CancelReason::Deadline)
    }

    pub fn record_response(&mut self, url: impl Into<String>, response: R, status: u16) {
        self.responses.push(SignerResponseRecord {
            url: url.into(),
            response,
            status,
        });
    }

    /// Count a failed replica. `status` is `None` for calls cancelled after a
    /// decision, which must not skew the majority error code.
    ///
    /// Returns `false` if the replica had already been counted.
    pub fn record_failure(&mut self, url: &str, status: Option<u16>) -> bool {
        if !self.failed_replicas.insert(url.to_string()) {
            return false;
        }
        if let Some(status) = status {
            *self.error_codes.entry(status).or_default() += 1;
        }
        true
    }

    /// Whether the replicas still in play can no longer reach the threshold.
    pub fn quorum_unreachable(&self) -> bool {
        self.total_replicas.saturating_sub(self.failed_replicas.len()) < self.threshold
    }

    /// Distinct error statuses that count towards the majority (all but 408).
    pub fn distinct_error_codes(&self) -> usize {
        self.error_codes
            .keys()
            .filter(|&&code| code != TIMEOUT_STATUS)
            .count()
    }

    /// Most frequent error status, excluding timeouts. Ties go to the lower
    /// status since 4xx codes are more useful to a client than 5xx.
    pub fn majority_error_code(&self) -> Option<u16> {
        let mut best: Option<(u16, usize)> = None;
        // BTreeMap iterates ascending, so a strict comparison keeps the lower code.
        for (&code, &count) in &self.error_codes {
            if code == TIMEOUT_STATUS || count == 0 {
                continue;
            }
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((code, count));
            }
        }
        best.map(|(code, _)| code)
    }

    /// Log when replicas disagreed on how they failed.
    pub fn log_error_code_inconsistency(&self) {
        if self.distinct_error_codes() > 1 {
            error!(
                session_id = %self.id,
                error_codes = ?self.error_codes,
                "{}",
                ErrorMessage::InconsistentSignerResponses
            );
        }
    }
}
