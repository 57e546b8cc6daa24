//! # Cancellation
//!
//! A broadcast, fire-once cancellation signal carrying the reason it fired.
//! Backed by a `tokio::sync::watch` channel so late subscribers still observe
//! a cancellation that happened before they started waiting.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Why a dispatch stopped waiting for replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The per-request deadline fired.
    Deadline,
    /// Too many replicas failed for the threshold to be reachable.
    QuorumUnreachable,
    /// The caller has all the responses it needs.
    ThresholdReached,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deadline => "deadline",
            Self::QuorumUnreachable => "quorum_unreachable",
            Self::ThresholdReached => "threshold_reached",
        };
        f.write_str(s)
    }
}

/// Cloneable handle to one cancellation signal.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<Option<CancelReason>>>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Only the first call has an effect; it returns `true`.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    /// Reason of the first `cancel`, if any.
    pub fn reason(&self) -> Option<CancelReason> {
        *self.tx.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolves once the signal has fired.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once fired.
        let _ = rx.wait_for(Option::is_some).await;
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}
