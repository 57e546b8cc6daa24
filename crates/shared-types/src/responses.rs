//! # Response Envelopes
//!
//! Every response carries `success` and `version`. Successful responses carry
//! the endpoint payload, failed ones an `error` string. The same shapes are
//! used for signer responses and for the combined response sent to clients,
//! which additionally carries `warnings`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::entities::DomainState;
use crate::errors::ErrorType;

/// Common behaviour of every response envelope.
pub trait OdisResponse:
    Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static
{
    /// The `success` discriminator.
    fn success(&self) -> bool;

    /// Reported protocol version.
    fn version(&self) -> &str;

    /// Whether the fields required by the discriminator are present.
    fn is_well_formed(&self) -> bool;

    /// Error string of a failed response.
    fn error(&self) -> Option<&str>;
}

/// Quota counters shared by PNP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaFields {
    pub performed_query_count: Option<u64>,
    pub total_quota: Option<u64>,
    pub block_number: Option<u64>,
}

/// Response to [`crate::SignMessageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageResponse {
    pub success: bool,
    pub version: String,
    /// Base64 blind signature (partial from a signer, combined from the combiner).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_query_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quota: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignMessageResponse {
    /// Successful response.
    pub fn ok(
        version: impl Into<String>,
        signature: String,
        performed_query_count: u64,
        total_quota: u64,
        block_number: Option<u64>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            version: version.into(),
            signature: Some(signature),
            performed_query_count: Some(performed_query_count),
            total_quota: Some(total_quota),
            block_number,
            warnings: Some(warnings),
            error: None,
        }
    }

    /// Failed response, optionally with the quota observed so far.
    pub fn failure(version: impl Into<String>, error: ErrorType, quota: QuotaFields) -> Self {
        Self {
            success: false,
            version: version.into(),
            signature: None,
            performed_query_count: quota.performed_query_count,
            total_quota: quota.total_quota,
            block_number: quota.block_number,
            warnings: None,
            error: Some(error.to_string()),
        }
    }
}

impl OdisResponse for SignMessageResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn is_well_formed(&self) -> bool {
        if self.success {
            self.signature.is_some()
                && self.performed_query_count.is_some()
                && self.total_quota.is_some()
        } else {
            self.error.is_some()
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Response to [`crate::PnpQuotaRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnpQuotaResponse {
    pub success: bool,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_query_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quota: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PnpQuotaResponse {
    pub fn ok(
        version: impl Into<String>,
        performed_query_count: u64,
        total_quota: u64,
        block_number: Option<u64>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            version: version.into(),
            performed_query_count: Some(performed_query_count),
            total_quota: Some(total_quota),
            block_number,
            warnings: Some(warnings),
            error: None,
        }
    }

    pub fn failure(version: impl Into<String>, error: ErrorType) -> Self {
        Self {
            success: false,
            version: version.into(),
            performed_query_count: None,
            total_quota: None,
            block_number: None,
            warnings: None,
            error: Some(error.to_string()),
        }
    }
}

impl OdisResponse for PnpQuotaResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn is_well_formed(&self) -> bool {
        if self.success {
            self.performed_query_count.is_some() && self.total_quota.is_some()
        } else {
            self.error.is_some()
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Response to [`crate::DomainRestrictedSignatureRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRestrictedSignatureResponse {
    pub success: bool,
    pub version: String,
    /// Base64 POPRF evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DomainState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainRestrictedSignatureResponse {
    pub fn ok(
        version: impl Into<String>,
        signature: String,
        status: DomainState,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            version: version.into(),
            signature: Some(signature),
            status: Some(status),
            warnings: Some(warnings),
            error: None,
        }
    }

    pub fn failure(
        version: impl Into<String>,
        error: ErrorType,
        status: Option<DomainState>,
    ) -> Self {
        Self {
            success: false,
            version: version.into(),
            signature: None,
            status,
            warnings: None,
            error: Some(error.to_string()),
        }
    }
}

impl OdisResponse for DomainRestrictedSignatureResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn is_well_formed(&self) -> bool {
        if self.success {
            self.signature.is_some() && self.status.is_some()
        } else {
            self.error.is_some()
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Responses whose success payload is a single [`DomainState`].
pub trait DomainStateResponse: OdisResponse {
    fn status(&self) -> Option<&DomainState>;
}

impl DomainStateResponse for DomainRestrictedSignatureResponse {
    fn status(&self) -> Option<&DomainState> {
        self.status.as_ref()
    }
}

macro_rules! domain_status_response {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub success: bool,
            pub version: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub status: Option<DomainState>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub warnings: Option<Vec<String>>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub error: Option<String>,
        }

        impl $name {
            pub fn ok(version: impl Into<String>, status: DomainState, warnings: Vec<String>) -> Self {
                Self {
                    success: true,
                    version: version.into(),
                    status: Some(status),
                    warnings: Some(warnings),
                    error: None,
                }
            }

            pub fn failure(version: impl Into<String>, error: ErrorType) -> Self {
                Self {
                    success: false,
                    version: version.into(),
                    status: None,
                    warnings: None,
                    error: Some(error.to_string()),
                }
            }
        }

        impl OdisResponse for $name {
            fn success(&self) -> bool {
                self.success
            }

            fn version(&self) -> &str {
                &self.version
            }

            fn is_well_formed(&self) -> bool {
                if self.success {
                    self.status.is_some()
                } else {
                    self.error.is_some()
                }
            }

            fn error(&self) -> Option<&str> {
                self.error.as_deref()
            }
        }

        impl DomainStateResponse for $name {
            fn status(&self) -> Option<&DomainState> {
                self.status.as_ref()
            }
        }
    };
}

domain_status_response!(
    /// Response to [`crate::DomainQuotaStatusRequest`].
    DomainQuotaStatusResponse
);
domain_status_response!(
    /// Response to [`crate::DisableDomainRequest`].
    DisableDomainResponse
);

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
}
