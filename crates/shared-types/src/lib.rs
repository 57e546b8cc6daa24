//! # Shared Types Crate
//!
//! Wire protocol spoken between the combiner, its clients and the signer
//! replicas it fans requests out to.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary or
//!   the network lives here.
//! - **Stable strings**: error and warning messages serialize to the exact
//!   strings clients already match on.
//! - **Shape checks, not trust**: signer responses are parsed into these types
//!   and then checked with [`OdisResponse::is_well_formed`] before use.

pub mod endpoints;
pub mod entities;
pub mod errors;
pub mod requests;
pub mod responses;
pub mod session_id;

pub use endpoints::*;
pub use entities::*;
pub use errors::*;
pub use requests::*;
pub use responses::*;
pub use session_id::SessionId;

/// Protocol version reported in every combiner response.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
