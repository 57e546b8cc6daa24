//! # Inbound Ports
//!
//! Domain-state responses already expose their payload through
//! [`shared_types::DomainStateResponse`]; quota-carrying responses do it
//! through [`QuotaSource`].

use shared_types::{OdisResponse, PnpQuotaResponse, QuotaFields, SignMessageResponse};

/// A response that reports an account's quota.
pub trait QuotaSource: OdisResponse {
    /// Quota counters as reported. Fields may be missing on failures.
    fn quota(&self) -> QuotaFields;

    /// Warnings the signer attached to its response.
    fn signer_warnings(&self) -> &[String];
}

impl QuotaSource for SignMessageResponse {
    fn quota(&self) -> QuotaFields {
        QuotaFields {
            performed_query_count: self.performed_query_count,
            total_quota: self.total_quota,
            block_number: self.block_number,
        }
    }

    fn signer_warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }
}

impl QuotaSource for PnpQuotaResponse {
    fn quota(&self) -> QuotaFields {
        QuotaFields {
            performed_query_count: self.performed_query_count,
            total_quota: self.total_quota,
            block_number: self.block_number,
        }
    }

    fn signer_warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }
}
