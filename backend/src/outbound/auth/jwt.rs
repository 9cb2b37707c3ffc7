//! HS256 JWT bearer tokens.
//!
//! Tokens carry the owner id in `sub` plus `iat`/`exp`. The shared secret
//! lives in zeroizing memory; signing and verification keys are derived from
//! it per call and dropped immediately.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::OwnerId;
use crate::domain::ports::{AccessTokenVerifier, TokenError};

/// Registered claims understood by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Errors raised while minting a token.
#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("token lifetime is out of range")]
    LifetimeOutOfRange,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 access tokens with a shared secret.
pub struct JwtAccessTokens {
    secret: Zeroizing<Vec<u8>>,
    leeway_secs: u64,
}

impl std::fmt::Debug for JwtAccessTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAccessTokens")
            .field("secret", &"<redacted>")
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtAccessTokens {
    /// Build a token service over `secret`. Expiry is checked without leeway.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_ref().to_vec()),
            leeway_secs: 0,
        }
    }

    /// Tolerate clock skew of `leeway` when checking `exp`.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway_secs = leeway.as_secs();
        self
    }

    /// Mint a token for `owner` that expires after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssueError`] when `ttl` overflows or signing fails.
    pub fn issue(&self, owner: &OwnerId, ttl: Duration) -> Result<String, TokenIssueError> {
        self.issue_at(owner, Utc::now(), ttl)
    }

    /// Mint a token as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssueError`] when `ttl` overflows or signing fails.
    pub fn issue_at(
        &self,
        owner: &OwnerId,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenIssueError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenIssueError::LifetimeOutOfRange)?;
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenIssueError::LifetimeOutOfRange)?;
        let claims = Claims {
            sub: owner.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let key = EncodingKey::from_secret(&self.secret);
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl AccessTokenVerifier for JwtAccessTokens {
    fn verify(&self, token: &str) -> Result<OwnerId, TokenError> {
        let key = DecodingKey::from_secret(&self.secret);
        let data = decode::<Claims>(token, &key, &self.validation()).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                ErrorKind::InvalidSignature => TokenError::invalid_signature(),
                ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => {
                    TokenError::invalid_subject("missing subject")
                }
                _ => TokenError::malformed(err.to_string()),
            }
        })?;
        OwnerId::new(data.claims.sub).map_err(|err| TokenError::invalid_subject(err.to_string()))
    }
}
