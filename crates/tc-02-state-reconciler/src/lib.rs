//! # State Reconciler (TC-02)
//!
//! Turns N divergent signer answers into the single value a client sees.
//!
//! ## Rank selection
//!
//! Every reconciled field is the value at rank `threshold - 1` after sorting
//! from least to most restrictive. That is the most permissive value at least
//! `threshold` signers agree on, which bounds what a minority of faulty
//! signers can make the client believe.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): quota and domain-state reconciliation,
//!   discrepancy diagnostics
//! - **Ports Layer** (`ports/`): how signer responses expose quota fields
//! - **Service Layer** (`service.rs`): [`StateReconciler`], configured once
//!   per process

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::config::ReconcilerConfig;
pub use domain::discrepancy::DiscrepancyReport;
pub use domain::domain_state::{reconcile_domain_state, ReconciledDomainState};
pub use domain::errors::ReconcileError;
pub use domain::quota::{reconcile_quota, ReconciledQuota};
pub use ports::inbound::QuotaSource;
pub use service::StateReconciler;
