//! Domain layer: configuration, key versions, client-facing errors and the
//! request codec.

pub mod config;
pub mod error;
pub mod key_versions;
pub mod responder;
pub mod validation;
