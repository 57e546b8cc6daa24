//! # Threshold Crypto Combiner (TC-01)
//!
//! Collects partial signatures from signer replicas and reconstructs the
//! group result once a threshold of them is available.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): share bookkeeping and the two combination
//!   variants, no I/O
//! - **Ports Layer** (`ports/`): the [`ThresholdCombiner`] contract the
//!   dispatcher feeds shares into
//!
//! ## Variants
//!
//! - [`BlsCombiner`]: combine-then-verify. Only when the combined signature
//!   fails does it verify shares one by one, caching good ones and
//!   permanently discarding bad ones.
//! - [`PoprfCombiner`]: blind aggregation. Shares cannot be checked by the
//!   combiner, so there is nothing to prune.

pub mod domain;
pub mod ports;

pub use domain::bls::BlsCombiner;
pub use domain::errors::CombineError;
pub use domain::poprf::PoprfCombiner;
pub use domain::share::PartialSignatureShare;
pub use ports::inbound::ThresholdCombiner;
