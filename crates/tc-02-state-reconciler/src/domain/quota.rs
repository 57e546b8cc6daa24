//! # Quota Reconciliation
//!
//! `performedQueryCount` is ranked ascending and `totalQuota` descending, so
//! in both cases rank `threshold - 1` is the `threshold`-th least
//! restrictive report. `blockNumber` is taken from the record that supplied
//! `totalQuota`, keeping the pair consistent.

use std::cmp::Reverse;

use shared_types::{QuotaFields, WarningMessage};
use tracing::{error, warn};

use super::errors::ReconcileError;
use crate::ports::inbound::QuotaSource;

/// Quota as the client should see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledQuota {
    pub performed_query_count: u64,
    pub total_quota: u64,
    pub block_number: Option<u64>,
    /// Non-fatal discrepancy notices for the client.
    pub warnings: Vec<String>,
}

impl ReconciledQuota {
    /// The counters in envelope form.
    pub fn fields(&self) -> QuotaFields {
        QuotaFields {
            performed_query_count: Some(self.performed_query_count),
            total_quota: Some(self.total_quota),
            block_number: self.block_number,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct QuotaRecord {
    performed_query_count: u64,
    total_quota: u64,
    block_number: Option<u64>,
}

/// Population mean and standard deviation.
pub(crate) fn mean_and_stddev(values: &[u64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

/// Reconcile quota across successful responses.
///
/// Fails when fewer than `threshold` successful responses carry both
/// counters, or when the `totalQuota` standard deviation exceeds
/// `max_total_quota_stddev`. A smaller non-zero deviation only adds a
/// warning.
pub fn reconcile_quota<'a, R, I>(
    threshold: usize,
    responses: I,
    max_total_quota_stddev: f64,
) -> Result<ReconciledQuota, ReconcileError>
where
    R: QuotaSource + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let records: Vec<QuotaRecord> = responses
        .into_iter()
        .filter(|r| r.success())
        .filter_map(|r| {
            let q = r.quota();
            Some(QuotaRecord {
                performed_query_count: q.performed_query_count?,
                total_quota: q.total_quota?,
                block_number: q.block_number,
            })
        })
        .collect();

    if threshold == 0 || records.len() < threshold {
        return Err(ReconcileError::InsufficientResponses {
            have: records.len(),
            need: threshold,
        });
    }

    let totals: Vec<u64> = records.iter().map(|r| r.total_quota).collect();
    let (mean, stddev) = mean_and_stddev(&totals);
    let mut warnings = Vec::new();
    if stddev > max_total_quota_stddev {
        error!(
            mean,
            stddev,
            max = max_total_quota_stddev,
            ?totals,
            "{}",
            WarningMessage::InconsistentSignerQuotaMeasurements
        );
        return Err(ReconcileError::InconsistentQuota {
            stddev,
            max: max_total_quota_stddev,
        });
    } else if stddev > 0.0 {
        warn!(mean, stddev, ?totals, "{}", WarningMessage::InconsistentSignerQuotaMeasurements);
        warnings.push(format!(
            "{}, using threshold signer as best guess",
            WarningMessage::InconsistentSignerQuotaMeasurements
        ));
    }

    let mut by_query_count: Vec<u64> = records.iter().map(|r| r.performed_query_count).collect();
    by_query_count.sort_unstable();
    let performed_query_count = by_query_count[threshold - 1];

    let mut by_total = records;
    by_total.sort_by_key(|r| (Reverse(r.total_quota), r.block_number));
    let threshold_record = by_total[threshold - 1];

    Ok(ReconciledQuota {
        performed_query_count,
        total_quota: threshold_record.total_quota,
        block_number: threshold_record.block_number,
        warnings,
    })
}
