//! # Signer Dispatch (TC-03)
//!
//! Sends one combiner request to every signer replica concurrently and
//! collects what comes back into a [`Session`].
//!
//! ## Concurrency
//!
//! One task per replica performs the HTTP exchange and nothing else. Results
//! are funnelled over a channel to the coordinator inside
//! [`SignerDispatcher::dispatch`], which is the only code that touches the
//! session. A single [`CancellationSignal`] is shared by every task; firing
//! it aborts all in-flight calls.
//!
//! A dispatch ends early when:
//!
//! - the deadline fires,
//! - so many replicas failed that the threshold can no longer be met,
//! - the caller's success callback reports it has enough.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): session bookkeeping, cancellation,
//!   signer-response parsing
//! - **Ports Layer** (`ports/`): the [`SignerTransport`] used to reach a
//!   replica
//! - **Adapters Layer** (`adapters/`): reqwest implementation of the
//!   transport
//! - **Service Layer** (`service.rs`): [`SignerDispatcher`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http::HttpSignerTransport;
pub use domain::cancellation::{CancelReason, CancellationSignal};
pub use domain::codec::{parse_signer_response, ResponseCodecError};
pub use domain::errors::TransportError;
pub use domain::session::{Session, SignerResponseRecord, SYNTHETIC_FAILURE_STATUS, TIMEOUT_STATUS};
pub use ports::outbound::{SignerHttpResponse, SignerRequest, SignerTransport};
pub use service::{DispatchOptions, DispatchSummary, SignerDispatcher};
