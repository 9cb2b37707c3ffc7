//! Driven port for turning a bearer credential into an owner identity.
//!
//! The task core trusts whatever owner this port yields; issuing credentials
//! is handled elsewhere.

use crate::domain::OwnerId;

use super::define_port_error;

define_port_error! {
    /// Reasons a bearer credential is refused.
    pub enum TokenError {
        /// The token is not structurally valid or uses an unexpected algorithm.
        Malformed { message: String } => "access token is malformed: {message}",
        /// The signature does not match the configured secret.
        InvalidSignature => "access token signature is invalid",
        /// The token is past its expiry.
        Expired => "access token has expired",
        /// The subject claim is missing or is not a valid owner id.
        InvalidSubject { message: String } => "access token subject is invalid: {message}",
    }
}

/// Verifies bearer credentials.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenVerifier: Send + Sync {
    /// Validate `token` and return the owner it was issued to.
    fn verify(&self, token: &str) -> Result<OwnerId, TokenError>;
}
