//! # Reconciler Configuration

use serde::{Deserialize, Serialize};

/// Tolerances for signer disagreement.
///
/// Only `max_total_quota_stddev` affects outcomes; the spreads only decide
/// what gets logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Population standard deviation of `totalQuota` above which reconciliation fails.
    pub max_total_quota_stddev: f64,
    /// `totalQuota` spread that is logged as an inconsistency.
    pub max_total_quota_spread: u64,
    /// `performedQueryCount` spread that is logged as an inconsistency.
    pub max_query_count_spread: u64,
    /// `blockNumber` spread that is logged as an inconsistency.
    pub max_block_spread: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_total_quota_stddev: 2.0,
            max_total_quota_spread: 2,
            max_query_count_spread: 5,
            max_block_spread: 3,
        }
    }
}

impl ReconcilerConfig {
    /// Reject tolerances that could never be satisfied.
    pub fn validate(&self) -> Result<(), String> {
        if !self.max_total_quota_stddev.is_finite() || self.max_total_quota_stddev < 0.0 {
            return Err(format!(
                "max_total_quota_stddev must be a non-negative number, got {}",
                self.max_total_quota_stddev
            ));
        }
        Ok(())
    }
}
