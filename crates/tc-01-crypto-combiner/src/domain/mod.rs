//! # Domain Layer
//!
//! Share bookkeeping and combination logic. No I/O.

pub mod bls;
pub mod errors;
pub mod poprf;
pub mod share;
