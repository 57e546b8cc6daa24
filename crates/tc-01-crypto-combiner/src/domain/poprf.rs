//! # POPRF Combiner
//!
//! Blind aggregation over every share received. There is no verified set:
//! the combiner cannot check a blinded partial evaluation on its own.

use shared_crypto::blind_aggregate;
use shared_types::KeyVersionInfo;
use tracing::error;

use super::errors::CombineError;
use super::share::{concat, PartialSignatureShare};
use crate::ports::inbound::ThresholdCombiner;

/// Blind-aggregating combiner for domain-restricted signatures.
#[derive(Debug)]
pub struct PoprfCombiner {
    threshold: usize,
    unverified: Vec<PartialSignatureShare>,
}

impl PoprfCombiner {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            unverified: Vec::new(),
        }
    }

    pub fn from_key_version(info: &KeyVersionInfo) -> Self {
        Self::new(info.threshold)
    }
}

impl ThresholdCombiner for PoprfCombiner {
    fn threshold(&self) -> usize {
        self.threshold
    }

    fn share_count(&self) -> usize {
        self.unverified.len()
    }

    fn add_share(&mut self, share: PartialSignatureShare) {
        self.unverified.push(share);
    }

    /// `_message` is unused: aggregation does not depend on the blinded input.
    fn combine(&mut self, _message: &[u8]) -> Result<Vec<u8>, CombineError> {
        let not_enough = CombineError::NotEnoughPartialSignatures {
            have: self.share_count(),
            need: self.threshold,
        };
        if !self.has_sufficient_shares() {
            error!(
                signatures = self.share_count(),
                required = self.threshold,
                "Not enough partial signatures"
            );
            return Err(not_enough);
        }

        blind_aggregate(self.threshold, &concat(self.unverified.iter())).ok_or(not_enough)
    }
}
