//! # Integration Tests
//!
//! End-to-end flows through the combiner over real HTTP.

pub mod dispatch;
pub mod pnp;
