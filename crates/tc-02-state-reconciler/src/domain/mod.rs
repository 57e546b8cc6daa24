//! # Domain Layer
//!
//! Pure reconciliation logic. Order-independent: everything sorts, nothing
//! relies on which signer answered first.

pub mod config;
pub mod discrepancy;
pub mod domain_state;
pub mod errors;
pub mod quota;
