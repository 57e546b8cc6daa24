//! # Response Discrepancy Diagnostics
//!
//! Compares successful signer responses with each other and logs what
//! diverges. Purely diagnostic: the outcome of a request never depends on
//! these checks. The returned report lists which findings fired.

use shared_types::{DomainState, DomainStateResponse, ErrorMessage, WarningMessage};
use tracing::{error, warn};

use super::config::ReconcilerConfig;
use crate::ports::inbound::QuotaSource;

/// Signer warnings that mean the signer served the request without a
/// working quota check.
const FAIL_OPEN_WARNINGS: [ErrorMessage; 3] = [
    ErrorMessage::FailingOpen,
    ErrorMessage::FailureToGetTotalQuota,
    ErrorMessage::FailureToGetDek,
];

/// Findings of one discrepancy pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscrepancyReport {
    /// No successful responses to compare.
    pub no_successes: bool,
    /// Some compared field differs from the first response.
    pub field_discrepancies: bool,
    pub total_quota_inconsistent: bool,
    pub query_count_inconsistent: bool,
    pub block_numbers_inconsistent: bool,
    pub disabled_states_inconsistent: bool,
    /// Signers whose response carried a fail-open warning.
    pub fail_open_signers: Vec<String>,
}

impl DiscrepancyReport {
    /// Whether anything at all was flagged.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

fn spread(values: impl Iterator<Item = u64>) -> u64 {
    let (min, max) = values.fold((u64::MAX, 0), |(lo, hi), v| (lo.min(v), hi.max(v)));
    max.saturating_sub(min)
}

/// Log discrepancies among PNP responses (sign or quota).
pub fn log_pnp_discrepancies<'a, R, I>(responses: I, config: &ReconcilerConfig) -> DiscrepancyReport
where
    R: QuotaSource + 'a,
    I: IntoIterator<Item = (&'a str, &'a R)>,
{
    let successes: Vec<(&str, &R)> = responses.into_iter().filter(|(_, r)| r.success()).collect();
    let mut report = DiscrepancyReport::default();

    let Some((_, first)) = successes.first() else {
        warn!("No successful signer responses found!");
        report.no_successes = true;
        return report;
    };

    let expected = first.quota();
    report.field_discrepancies = successes.iter().any(|(_, r)| {
        r.quota() != expected
            || r.version() != first.version()
            || r.signer_warnings() != first.signer_warnings()
    });
    if report.field_discrepancies {
        let values: Vec<String> = successes
            .iter()
            .map(|(url, r)| format!("{url}: {:?} v{} {:?}", r.quota(), r.version(), r.signer_warnings()))
            .collect();
        warn!(?values, "{}", WarningMessage::SignerResponseDiscrepancies);
    }

    let quotas: Vec<_> = successes.iter().map(|(_, r)| r.quota()).collect();

    let total_spread = spread(quotas.iter().filter_map(|q| q.total_quota));
    if total_spread >= config.max_total_quota_spread && total_spread > 0 {
        error!(spread = total_spread, "{}", WarningMessage::InconsistentSignerQuotaMeasurements);
        report.total_quota_inconsistent = true;
    }

    let query_spread = spread(quotas.iter().filter_map(|q| q.performed_query_count));
    if query_spread >= config.max_query_count_spread && query_spread > 0 {
        error!(spread = query_spread, "{}", WarningMessage::InconsistentSignerQueryMeasurements);
        report.query_count_inconsistent = true;
    }

    let with_block = quotas.iter().filter(|q| q.block_number.is_some()).count();
    let block_spread = spread(quotas.iter().filter_map(|q| q.block_number));
    let missing_block = with_block > 0 && with_block < quotas.len();
    if missing_block || (block_spread >= config.max_block_spread && block_spread > 0) {
        error!(
            spread = block_spread,
            missing = quotas.len() - with_block,
            "{}",
            WarningMessage::InconsistentSignerBlockNumbers
        );
        report.block_numbers_inconsistent = true;
    }

    for (url, response) in &successes {
        for warning in response.signer_warnings() {
            if let Some(kind) = FAIL_OPEN_WARNINGS.iter().find(|w| w.as_str() == warning.as_str()) {
                error!(signer = %url, warning = %kind, "Signer served request without quota check");
                if !report.fail_open_signers.iter().any(|s| s.as_str() == *url) {
                    report.fail_open_signers.push((*url).to_string());
                }
            }
        }
    }

    report
}

/// Log discrepancies among domain-state responses. `now` is ignored since
/// signer clocks legitimately differ.
pub fn log_domain_discrepancies<'a, R, I>(responses: I) -> DiscrepancyReport
where
    R: DomainStateResponse + 'a,
    I: IntoIterator<Item = (&'a str, &'a R)>,
{
    let successes: Vec<(&str, &R, DomainState)> = responses
        .into_iter()
        .filter(|(_, r)| r.success())
        .filter_map(|(url, r)| r.status().map(|s| (url, r, *s)))
        .collect();
    let mut report = DiscrepancyReport::default();

    let Some((_, first, expected)) = successes.first() else {
        warn!("No successful signer responses found!");
        report.no_successes = true;
        return report;
    };

    report.field_discrepancies = successes.iter().any(|(_, r, s)| {
        r.version() != first.version()
            || s.counter != expected.counter
            || s.timer != expected.timer
            || s.disabled != expected.disabled
    });
    if report.field_discrepancies {
        let values: Vec<String> = successes
            .iter()
            .map(|(url, r, s)| format!("{url}: {s:?} v{}", r.version()))
            .collect();
        warn!(?values, "{}", WarningMessage::SignerResponseDiscrepancies);
    }

    if successes.iter().any(|(_, _, s)| s.disabled != expected.disabled) {
        error!("{}", WarningMessage::InconsistentSignerDomainDisabledStates);
        report.disabled_states_inconsistent = true;
    }

    report
}
