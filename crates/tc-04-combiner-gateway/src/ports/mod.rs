pub mod outbound;

pub use outbound::{AuthRequest, RequestAuthenticator};
