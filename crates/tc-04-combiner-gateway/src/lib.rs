//! # Combiner Gateway (TC-04)
//!
//! Client-facing HTTP front end of the combiner.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     COMBINER GATEWAY (tc-04)                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  axum Router ── TracingLayer ── RequestBodyLimitLayer             │
//! │       │                                                           │
//! │  EndpointHandler<A>   (one per endpoint, generic pipeline)        │
//! │       │  validate ─ authenticate ─ key version ─ dispatch ─ combine│
//! │       │                                                           │
//! │  ┌────┴──────────┬──────────────────┬─────────────────────┐      │
//! │  │ PnpSignAction │ DomainSignAction │ quota / disable ... │      │
//! │  └────┬──────────┴────────┬─────────┴──────────┬──────────┘      │
//! └───────┼───────────────────┼────────────────────┼─────────────────┘
//!         ▼                   ▼                    ▼
//!  tc-01 combiners    tc-03 dispatcher     tc-02 reconciler
//! ```
//!
//! - **Domain Layer** (`domain/`): configuration, key versions, client
//!   errors, request validation and the write-once responder
//! - **Ports Layer** (`ports/`): [`RequestAuthenticator`]
//! - **Adapters Layer** (`adapters/`): [`HeaderAuthenticator`]
//! - **Actions** (`actions/`): per-endpoint combination logic
//! - **Service Layer** (`service.rs`): [`CombinerService`] lifecycle
//!
//! ## Usage
//!
//! ```ignore
//! use tc_04_combiner_gateway::{CombinerConfig, CombinerService, HeaderAuthenticator};
//! use tc_03_signer_dispatch::HttpSignerTransport;
//!
//! let service = CombinerService::new(
//!     config,
//!     Arc::new(HttpSignerTransport::new()?),
//!     Arc::new(HeaderAuthenticator::new()),
//! )?;
//! service.start(shutdown_signal()).await?;
//! ```

pub mod actions;
pub mod adapters;
pub mod domain;
pub mod handler;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

#[cfg(test)]
mod test_support;

pub use actions::{
    DisableDomainAction, DomainQuotaStatusAction, DomainSignAction, EndpointAction, PnpQuotaAction,
    PnpSignAction,
};
pub use adapters::HeaderAuthenticator;
pub use domain::config::{CombinerConfig, ConfigError, KeysConfig, ServerConfig, ServiceConfig};
pub use domain::error::{ApiError, ClientResponse, GatewayError};
pub use domain::key_versions::{KeyVersionError, KeyVersionRegistry};
pub use domain::validation::CodecError;
pub use handler::{EndpointHandler, ServiceContext};
pub use ports::{AuthRequest, RequestAuthenticator};
pub use service::CombinerService;

/// Version reported in every response envelope.
pub use shared_types::VERSION;
