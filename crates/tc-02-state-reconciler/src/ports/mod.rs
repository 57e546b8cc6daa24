//! # Ports Layer
//!
//! - **Inbound (Driving)**: read access to signer responses

pub mod inbound;
