//! # Client Requests
//!
//! Bodies accepted by the combiner. Signers receive the same bodies verbatim.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::entities::{SequentialDelayDomain, SequentialDelayDomainOptions};

/// Common behaviour of every request body.
pub trait OdisRequest: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// Client-chosen id for correlating logs across tiers.
    fn session_id(&self) -> Option<&str>;
}

/// Request for a blind signature over a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageRequest {
    /// `0x`-prefixed account address.
    pub account: String,
    /// Base64 blinded phone number.
    pub blinded_query_phone_number: String,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Request for an account's query quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnpQuotaRequest {
    pub account: String,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Discriminator carried in the `type` field of domain requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainRequestType {
    DomainRestrictedSignatureRequest,
    DomainQuotaStatusRequest,
    DisableDomainRequest,
}

/// Shared accessors of the three domain request bodies.
pub trait DomainRequest: OdisRequest {
    /// Discriminator every instance of this request must carry.
    const TYPE: DomainRequestType;

    fn request_type(&self) -> DomainRequestType;
    fn domain(&self) -> &SequentialDelayDomain;
    fn options(&self) -> &SequentialDelayDomainOptions;
}

/// Request for a POPRF evaluation under a rate-limited domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRestrictedSignatureRequest {
    #[serde(rename = "type")]
    pub request_type: DomainRequestType,
    pub domain: SequentialDelayDomain,
    pub options: SequentialDelayDomainOptions,
    /// Base64 blinded message.
    pub blinded_message: String,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Request for a domain's current rate-limit state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainQuotaStatusRequest {
    #[serde(rename = "type")]
    pub request_type: DomainRequestType,
    pub domain: SequentialDelayDomain,
    pub options: SequentialDelayDomainOptions,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Request to disable a domain permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableDomainRequest {
    #[serde(rename = "type")]
    pub request_type: DomainRequestType,
    pub domain: SequentialDelayDomain,
    pub options: SequentialDelayDomainOptions,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl OdisRequest for SignMessageRequest {
    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl OdisRequest for PnpQuotaRequest {
    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

macro_rules! impl_domain_request {
    ($ty:ty, $kind:ident) => {
        impl OdisRequest for $ty {
            fn session_id(&self) -> Option<&str> {
                self.session_id.as_deref()
            }
        }

        impl DomainRequest for $ty {
            const TYPE: DomainRequestType = DomainRequestType::$kind;

            fn request_type(&self) -> DomainRequestType {
                self.request_type
            }

            fn domain(&self) -> &SequentialDelayDomain {
                &self.domain
            }

            fn options(&self) -> &SequentialDelayDomainOptions {
                &self.options
            }
        }
    };
}

impl_domain_request!(DomainRestrictedSignatureRequest, DomainRestrictedSignatureRequest);
impl_domain_request!(DomainQuotaStatusRequest, DomainQuotaStatusRequest);
impl_domain_request!(DisableDomainRequest, DisableDomainRequest);
