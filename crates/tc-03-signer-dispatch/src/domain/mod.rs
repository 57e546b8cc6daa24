//! Domain layer for signer dispatch.

pub mod cancellation;
pub mod codec;
pub mod errors;
pub mod session;
