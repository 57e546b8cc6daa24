//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::CombineError;
use crate::domain::share::PartialSignatureShare;

/// A growing set of partial results that can be combined once a threshold
/// of them exists.
///
/// Owned by exactly one coordinating task per request, so `&mut self` is
/// enough; implementations need only be `Send`.
pub trait ThresholdCombiner: Send {
    /// Shares required to combine.
    fn threshold(&self) -> usize;

    /// All shares currently counted toward the threshold.
    fn share_count(&self) -> usize;

    /// Record a share. Never fails.
    fn add_share(&mut self, share: PartialSignatureShare);

    /// `share_count() >= threshold()`.
    fn has_sufficient_shares(&self) -> bool {
        self.share_count() >= self.threshold()
    }

    /// Combine the current shares into one result.
    ///
    /// Safe to call repeatedly as shares arrive; callers check
    /// [`has_sufficient_shares`](Self::has_sufficient_shares) first.
    fn combine(&mut self, message: &[u8]) -> Result<Vec<u8>, CombineError>;
}
