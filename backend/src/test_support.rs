//! Test utilities shared by unit tests and the integration suites in `tests/`.
//!
//! Compiled for `cfg(test)` and when the `test-support` feature is enabled.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::OwnerId;
use crate::outbound::auth::JwtAccessTokens;

/// Clock frozen at a settable instant.
///
/// Time only moves when a test calls [`MutableClock::advance_seconds`], which
/// makes timestamp assertions deterministic.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Secret shared by test token issuers and verifiers.
pub const TEST_JWT_SECRET: &[u8] = b"taskflow-test-secret-with-enough-entropy";

/// Token service keyed with [`TEST_JWT_SECRET`].
#[must_use]
pub fn test_tokens() -> Arc<JwtAccessTokens> {
    Arc::new(JwtAccessTokens::new(TEST_JWT_SECRET))
}

/// Mint a bearer token for `owner` valid for thirty minutes.
///
/// # Panics
///
/// Panics when `owner` is not a valid owner id or signing fails.
#[must_use]
pub fn bearer_for(tokens: &JwtAccessTokens, owner: &str) -> String {
    let owner = OwnerId::new(owner).unwrap_or_else(|err| panic!("test owner id: {err}"));
    let token = tokens
        .issue(&owner, std::time::Duration::from_secs(30 * 60))
        .unwrap_or_else(|err| panic!("sign test token: {err}"));
    format!("Bearer {token}")
}
