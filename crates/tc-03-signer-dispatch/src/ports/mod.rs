//! Ports for signer dispatch.

pub mod outbound;
