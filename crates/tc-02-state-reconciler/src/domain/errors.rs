//! # Reconcile Errors

use thiserror::Error;

/// Errors from reconciling signer state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReconcileError {
    /// Fewer successful responses than the threshold.
    #[error("Insufficient number of signer responses: {have}/{need}")]
    InsufficientResponses { have: usize, need: usize },

    /// Enough responses, but too few of them report the domain as enabled.
    #[error("Insufficient number of signer responses. Domain may be disabled: {enabled}/{need} enabled")]
    DomainMayBeDisabled { enabled: usize, need: usize },

    /// Signers disagree on total quota beyond the configured tolerance.
    #[error("Inconsistent signer quota measurements: stddev {stddev:.3} exceeds {max:.3}")]
    InconsistentQuota { stddev: f64, max: f64 },
}
