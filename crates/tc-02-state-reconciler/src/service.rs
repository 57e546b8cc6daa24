//! # State Reconciler Service
//!
//! Binds the process-wide tolerances to the reconciliation functions so
//! endpoint actions only pass threshold and responses.

use shared_types::{DomainState, DomainStateResponse};

use crate::domain::config::ReconcilerConfig;
use crate::domain::discrepancy::{log_domain_discrepancies, log_pnp_discrepancies, DiscrepancyReport};
use crate::domain::domain_state::{reconcile_domain_state, ReconciledDomainState};
use crate::domain::errors::ReconcileError;
use crate::domain::quota::{reconcile_quota, ReconciledQuota};
use crate::ports::inbound::QuotaSource;

/// Reconciler configured once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct StateReconciler {
    config: ReconcilerConfig,
}

impl StateReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile quota fields across PNP responses.
    pub fn reconcile_quota<'a, R, I>(&self, threshold: usize, responses: I) -> Result<ReconciledQuota, ReconcileError>
    where
        R: QuotaSource + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        reconcile_quota(threshold, responses, self.config.max_total_quota_stddev)
    }

    /// Reconcile domain state across successful domain responses.
    pub fn reconcile_domain<'a, R, I>(
        &self,
        threshold: usize,
        total_replicas: usize,
        responses: I,
    ) -> Result<ReconciledDomainState, ReconcileError>
    where
        R: DomainStateResponse + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let states: Vec<DomainState> = responses
            .into_iter()
            .filter(|r| r.success())
            .filter_map(|r| r.status().copied())
            .collect();
        reconcile_domain_state(threshold, total_replicas, &states)
    }

    pub fn log_pnp_discrepancies<'a, R, I>(&self, responses: I) -> DiscrepancyReport
    where
        R: QuotaSource + 'a,
        I: IntoIterator<Item = (&'a str, &'a R)>,
    {
        log_pnp_discrepancies(responses, &self.config)
    }

    pub fn log_domain_discrepancies<'a, R, I>(&self, responses: I) -> DiscrepancyReport
    where
        R: DomainStateResponse + 'a,
        I: IntoIterator<Item = (&'a str, &'a R)>,
    {
        log_domain_discrepancies(responses)
    }
}
