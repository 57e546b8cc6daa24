//! # Domain State Reconciliation
//!
//! Rate-limit state is reconciled in two ranked passes. `counter` is ranked
//! first; `timer` and `now` are then taken together from one record among
//! those at or below the threshold counter, ranked by `timer - now`.
//! Pairing them from the same record keeps `now >= timer` meaningful.

use shared_types::{DomainState, WarningMessage};
use tracing::error;

use super::errors::ReconcileError;

/// Domain state as the client should see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledDomainState {
    pub state: DomainState,
    pub warnings: Vec<String>,
}

/// Reconcile domain states reported by successful signers.
///
/// `total_replicas` is the configured signer count, not the number of
/// responses. When the replicas not known to be disabled cannot form a
/// threshold, the domain is reported as [`DomainState::DISABLED`].
pub fn reconcile_domain_state(
    threshold: usize,
    total_replicas: usize,
    states: &[DomainState],
) -> Result<ReconciledDomainState, ReconcileError> {
    if threshold == 0 || states.len() < threshold {
        return Err(ReconcileError::InsufficientResponses {
            have: states.len(),
            need: threshold,
        });
    }

    let mut warnings = Vec::new();
    let num_disabled = states.iter().filter(|s| s.disabled).count();
    if num_disabled > 0 && num_disabled < states.len() {
        error!(
            disabled = num_disabled,
            responses = states.len(),
            "{}",
            WarningMessage::InconsistentSignerDomainDisabledStates
        );
        warnings.push(WarningMessage::InconsistentSignerDomainDisabledStates.to_string());
    }

    if total_replicas.saturating_sub(num_disabled) < threshold {
        return Ok(ReconciledDomainState {
            state: DomainState::DISABLED,
            warnings,
        });
    }

    let mut enabled: Vec<DomainState> = states.iter().filter(|s| !s.disabled).copied().collect();
    if enabled.len() < threshold {
        return Err(ReconcileError::DomainMayBeDisabled {
            enabled: enabled.len(),
            need: threshold,
        });
    }

    enabled.sort_by_key(|s| s.counter);
    let threshold_counter = enabled[threshold - 1].counter;

    let mut candidates: Vec<DomainState> = enabled
        .into_iter()
        .filter(|s| s.counter <= threshold_counter)
        .collect();
    candidates.sort_by_key(|s| (i128::from(s.timer) - i128::from(s.now), s.timer, s.now));
    let timing = candidates[threshold - 1];

    Ok(ReconciledDomainState {
        state: DomainState {
            counter: threshold_counter,
            timer: timing.timer,
            disabled: false,
            now: timing.now,
        },
        warnings,
    })
}
