//! POPRF blind aggregation.
//!
//! Partial evaluations are G2 points under each signer's key share. They are
//! blinded with a factor only the client knows, so the combiner cannot check
//! them individually. Aggregation is plain interpolation; a bad share only
//! shows up when the client fails to unblind the result.

use std::collections::HashSet;

use blstrs::G2Projective;

use crate::lagrange::interpolate_at_zero;
use crate::points::{decode_g2, encode_g2, split_share, G2_COMPRESSED_LEN, SHARE_INDEX_LEN};
use crate::CryptoError;

/// Size of one partial evaluation on the wire.
pub const POPRF_SHARE_LEN: usize = SHARE_INDEX_LEN + G2_COMPRESSED_LEN;

/// One signer's blinded partial evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoprfShare {
    /// Share index (0-based).
    pub index: u32,
    /// Partial evaluation point.
    pub point: G2Projective,
}

impl PoprfShare {
    /// Parse `index || compressed G2`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (index, point) = split_share(bytes, G2_COMPRESSED_LEN)?;
        Ok(Self {
            index,
            point: decode_g2(point)?,
        })
    }

    /// Serialize to `index || compressed G2`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(POPRF_SHARE_LEN);
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_g2(&self.point));
        out
    }
}

/// Aggregate blinded partial evaluations into one blinded evaluation.
///
/// `shares` is the concatenation of wire-format shares. Malformed shares and
/// repeated indices are skipped. Returns `None` when fewer than `threshold`
/// usable shares remain.
pub fn blind_aggregate(threshold: usize, shares: &[u8]) -> Option<Vec<u8>> {
    if threshold == 0 || shares.len() % POPRF_SHARE_LEN != 0 {
        return None;
    }

    let mut seen = HashSet::new();
    let points: Vec<(u32, G2Projective)> = shares
        .chunks_exact(POPRF_SHARE_LEN)
        .filter_map(|chunk| PoprfShare::from_bytes(chunk).ok())
        .filter(|share| seen.insert(share.index))
        .take(threshold)
        .map(|share| (share.index, share.point))
        .collect();

    if points.len() < threshold {
        return None;
    }
    interpolate_at_zero(&points)
        .ok()
        .map(|point| encode_g2(&point).to_vec())
}
