//! # Partial Signature Shares

/// One replica's contribution toward a combined result.
///
/// `signature` is the raw wire form (index prefix plus compressed point),
/// already base64-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSignatureShare {
    /// Primary URL of the replica that produced the share.
    pub replica_url: String,
    /// Raw share bytes.
    pub signature: Vec<u8>,
}

impl PartialSignatureShare {
    pub fn new(replica_url: impl Into<String>, signature: Vec<u8>) -> Self {
        Self {
            replica_url: replica_url.into(),
            signature,
        }
    }

    /// Share index from the little-endian prefix, if the share is long enough.
    pub fn index(&self) -> Option<u32> {
        let prefix: [u8; 4] = self.signature.get(..4)?.try_into().ok()?;
        Some(u32::from_le_bytes(prefix))
    }
}

/// Concatenate share bytes in iteration order.
pub(crate) fn concat<'a>(shares: impl Iterator<Item = &'a PartialSignatureShare>) -> Vec<u8> {
    shares.flat_map(|s| s.signature.iter().copied()).collect()
}
