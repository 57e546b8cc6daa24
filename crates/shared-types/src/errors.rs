//! # Message Catalogue
//!
//! Error and warning strings returned to clients and written to logs.
//! Clients match on these exact strings, so variants serialize to them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! message_catalogue {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant, )*
        }

        impl $name {
            /// Stable wire string.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

message_catalogue! {
    /// Failures on the combiner or signer side.
    pub enum ErrorMessage {
        UnknownError => "CELO_ODIS_ERR_00 Something went wrong",
        NotEnoughPartialSignatures => "CELO_ODIS_ERR_05 SIG_ERR Not enough partial signatures",
        InconsistentSignerResponses => "CELO_ODIS_ERR_06 SIG_ERR Inconsistent responses from signers",
        SignerRequestError => "CELO_ODIS_ERR_08 SIG_ERR Error requesting signature from signer",
        TimeoutFromSigner => "CELO_ODIS_ERR_09 SIG_ERR Timeout from signer",
        InvalidSignerResponse => "CELO_ODIS_ERR_10 SIG_ERR Invalid signer response",
        SignerResponseFailedWithOkStatus => "CELO_ODIS_ERR_11 SIG_ERR Signer request failed with 'OK' status",
        InvalidKeyVersionResponse => "CELO_ODIS_ERR_12 SIG_ERR Signer response key version header is invalid or not supported",
        SignatureComputationFailure => "CELO_ODIS_ERR_13 SIG_ERR Failed to compute BLS signature",
        ThresholdPnpQuotaStatusFailure => "CELO_ODIS_ERR_14 QUOTA_ERR Failed to get PNP quota status from a threshold of signers",
        ThresholdDomainQuotaStatusFailure => "CELO_ODIS_ERR_15 QUOTA_ERR Failed to get domain quota status from a threshold of signers",
        ThresholdDisableDomainFailure => "CELO_ODIS_ERR_16 DOMAIN_ERR Failed to disable domain on a threshold of signers",
        FailingOpen => "CELO_ODIS_ERR_17 SIGNER Failing open on signer quota check",
        FailingClosed => "CELO_ODIS_ERR_18 SIGNER Failing closed on signer quota check",
        FailureToGetTotalQuota => "CELO_ODIS_ERR_19 SIGNER Failed to get total quota",
        FailureToGetDek => "CELO_ODIS_ERR_20 SIGNER Failed to get data encryption key",
    }
}

message_catalogue! {
    /// Client-attributable conditions and discrepancy notices.
    pub enum WarningMessage {
        UnauthenticatedUser => "CELO_ODIS_WARN_01 BAD_INPUT Missing or invalid authentication",
        InvalidInput => "CELO_ODIS_WARN_02 BAD_INPUT Invalid input parameters",
        ExceededQuota => "CELO_ODIS_WARN_03 QUOTA Requester exceeded service query quota",
        InconsistentSignerQuotaMeasurements => "CELO_ODIS_WARN_06 SIGNER Discrepancy found in signers' quota measurements",
        InconsistentSignerQueryMeasurements => "CELO_ODIS_WARN_07 SIGNER Discrepancy found in signers' query count measurements",
        InconsistentSignerBlockNumbers => "CELO_ODIS_WARN_08 SIGNER Discrepancy found in signers' latest block number",
        InconsistentSignerDomainDisabledStates => "CELO_ODIS_WARN_09 SIGNER Discrepancy found in signers' domain disabled states",
        ApiUnavailable => "CELO_ODIS_WARN_11 BAD_INPUT API is unavailable",
        InvalidKeyVersionRequest => "CELO_ODIS_WARN_12 BAD_INPUT Request key version header is invalid or not supported",
        SignerResponseDiscrepancies => "CELO_ODIS_WARN_13 SIGNER Discrepancies detected in signer responses",
        CancelledRequestToSigner => "CELO_ODIS_WARN_14 SIGNER Cancelled request to signer",
        DisabledDomain => "CELO_ODIS_WARN_15 BAD_INPUT Domain has been disabled",
    }
}

/// Either catalogue entry, as carried in the `error` field of a failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorType {
    Error(ErrorMessage),
    Warning(WarningMessage),
}

impl ErrorType {
    /// Stable wire string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error(e) => e.as_str(),
            Self::Warning(w) => w.as_str(),
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorMessage> for ErrorType {
    fn from(e: ErrorMessage) -> Self {
        Self::Error(e)
    }
}

impl From<WarningMessage> for ErrorType {
    fn from(w: WarningMessage) -> Self {
        Self::Warning(w)
    }
}
