//! # BLS Threshold Combiner
//!
//! Optimistically combines unverified shares and verifies the result once.
//! Per-share verification costs a pairing per share, so it runs only after a
//! failed combine, and its outcome is cached:
//!
//! - shares that verify move to `verified` and are never checked again
//! - shares that fail, or repeat the index of a verified share, are dropped
//!   and their replica is barred from contributing for the rest of the
//!   request

use std::collections::HashSet;

use shared_crypto::points::decode_g1;
use shared_crypto::{
    combine_signatures, verify_blind_signature, verify_partial_signature, PublicPolynomial,
};
use shared_types::KeyVersionInfo;
use tracing::{debug, error, warn};

use super::errors::CombineError;
use super::share::{concat, PartialSignatureShare};
use crate::ports::inbound::ThresholdCombiner;

/// Combine-then-verify BLS combiner for one request.
#[derive(Debug)]
pub struct BlsCombiner {
    threshold: usize,
    public_key: Vec<u8>,
    polynomial: PublicPolynomial,
    verified: Vec<PartialSignatureShare>,
    unverified: Vec<PartialSignatureShare>,
    discarded: HashSet<String>,
}

impl BlsCombiner {
    /// Build from raw key material.
    pub fn new(threshold: usize, public_key: Vec<u8>, polynomial: &[u8]) -> Result<Self, CombineError> {
        let polynomial = PublicPolynomial::from_bytes(polynomial).map_err(CombineError::InvalidKey)?;
        Ok(Self {
            threshold,
            public_key,
            polynomial,
            verified: Vec::new(),
            unverified: Vec::new(),
            discarded: HashSet::new(),
        })
    }

    /// Build from a configured key version.
    pub fn from_key_version(info: &KeyVersionInfo) -> Result<Self, CombineError> {
        Self::new(info.threshold, info.public_key.clone(), &info.polynomial)
    }

    /// Shares that passed individual verification.
    pub fn verified_count(&self) -> usize {
        self.verified.len()
    }

    /// Whether shares from `replica_url` have been rejected.
    pub fn is_discarded(&self, replica_url: &str) -> bool {
        self.discarded.contains(replica_url)
    }

    fn try_combine(&self, message: &[u8]) -> Result<Vec<u8>, shared_crypto::CryptoError> {
        let buffer = concat(self.verified.iter().chain(self.unverified.iter()));
        let signature = combine_signatures(self.threshold, &buffer)?;
        verify_blind_signature(&self.public_key, message, &signature)?;
        Ok(signature.to_vec())
    }

    fn holds_verified_index(&self, index: Option<u32>) -> bool {
        index.is_some() && self.verified.iter().any(|s| s.index() == index)
    }

    fn prune_unverified(&mut self, message: &[u8]) {
        for share in std::mem::take(&mut self.unverified) {
            match verify_partial_signature(&self.polynomial, message, &share.signature) {
                Ok(()) if self.holds_verified_index(share.index()) => {
                    warn!(signer = %share.replica_url, index = ?share.index(), "Duplicate share index");
                    self.discarded.insert(share.replica_url);
                }
                Ok(()) => self.verified.push(share),
                Err(e) => {
                    error!(signer = %share.replica_url, error = %e, "Invalid partial signature");
                    self.discarded.insert(share.replica_url);
                }
            }
        }
    }
}

impl ThresholdCombiner for BlsCombiner {
    fn threshold(&self) -> usize {
        self.threshold
    }

    fn share_count(&self) -> usize {
        self.verified.len() + self.unverified.len()
    }

    fn add_share(&mut self, share: PartialSignatureShare) {
        if self.discarded.contains(&share.replica_url) {
            debug!(signer = %share.replica_url, "Ignoring share from signer with rejected signature");
            return;
        }
        self.unverified.push(share);
    }

    fn combine(&mut self, message: &[u8]) -> Result<Vec<u8>, CombineError> {
        if !self.has_sufficient_shares() {
            error!(
                signatures = self.share_count(),
                required = self.threshold,
                "Not enough partial signatures"
            );
            return Err(CombineError::NotEnoughPartialSignatures {
                have: self.share_count(),
                need: self.threshold,
            });
        }
        decode_g1(message).map_err(CombineError::InvalidMessage)?;

        match self.try_combine(message) {
            Ok(signature) => Ok(signature),
            Err(e) => {
                warn!(error = %e, "Combined signature invalid, verifying partial signatures");
                self.prune_unverified(message);
                Err(CombineError::NotEnoughPartialSignatures {
                    have: self.share_count(),
                    need: self.threshold,
                })
            }
        }
    }
}
