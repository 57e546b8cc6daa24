//! # Endpoints
//!
//! Paths exposed by the combiner and the matching paths on each signer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header carrying the key version on both client and signer requests.
///
/// Lowercase so it can be used with `HeaderName::from_static`.
pub const KEY_VERSION_HEADER: &str = "keyversion";

/// Client-facing combiner endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinerEndpoint {
    /// Phone-number-privacy blind signature.
    PnpSign,
    /// Phone-number-privacy quota status.
    PnpQuota,
    /// Domain-restricted blind signature (POPRF).
    DomainSign,
    /// Domain rate-limit state.
    DomainQuotaStatus,
    /// Permanently disable a domain.
    DisableDomain,
    /// Liveness probe.
    Status,
}

impl CombinerEndpoint {
    /// HTTP path served by the combiner.
    pub const fn path(&self) -> &'static str {
        match self {
            Self::PnpSign => "/getBlindedMessageSignature",
            Self::PnpQuota => "/getQuotaStatus",
            Self::DomainSign => "/domain/sign",
            Self::DomainQuotaStatus => "/domain/quotaStatus",
            Self::DisableDomain => "/domain/disable",
            Self::Status => "/status",
        }
    }

    /// Signer path this endpoint fans out to, if any.
    pub const fn signer_endpoint(&self) -> Option<SignerEndpoint> {
        match self {
            Self::PnpSign => Some(SignerEndpoint::PnpSign),
            Self::PnpQuota => Some(SignerEndpoint::PnpQuota),
            Self::DomainSign => Some(SignerEndpoint::DomainSign),
            Self::DomainQuotaStatus => Some(SignerEndpoint::DomainQuotaStatus),
            Self::DisableDomain => Some(SignerEndpoint::DisableDomain),
            Self::Status => None,
        }
    }
}

impl fmt::Display for CombinerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Endpoints exposed by every signer replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignerEndpoint {
    /// Partial BLS signature over a blinded phone number.
    PnpSign,
    /// Per-account quota.
    PnpQuota,
    /// Partial POPRF evaluation for a domain.
    DomainSign,
    /// Domain rate-limit state.
    DomainQuotaStatus,
    /// Disable a domain.
    DisableDomain,
}

impl SignerEndpoint {
    /// HTTP path on the signer.
    pub const fn path(&self) -> &'static str {
        match self {
            Self::PnpSign => "/getBlindedMessagePartialSig",
            Self::PnpQuota => "/getQuota",
            Self::DomainSign => "/domain/sign",
            Self::DomainQuotaStatus => "/domain/quotaStatus",
            Self::DisableDomain => "/domain/disable",
        }
    }
}

impl fmt::Display for SignerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
