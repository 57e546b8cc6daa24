//! # Ports Layer
//!
//! - **Inbound (Driving)**: the combiner contract used by endpoint actions

pub mod inbound;
