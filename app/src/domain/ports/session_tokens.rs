//! Port through which the account service authenticates backend requests.
//!
//! The hosted database reads the signed-in user's ID token from here. The
//! account service keeps it in step with its own session and binds the
//! sign-up token for the writes that happen during registration.

use crate::domain::IdToken;

#[cfg_attr(test, mockall::automock)]
pub trait SessionTokenStore: Send + Sync {
    /// Authenticate subsequent backend requests with `token`.
    fn bind(&self, token: &IdToken);

    /// Send subsequent backend requests anonymously.
    fn clear(&self);
}

/// Fixture store for backends without authentication.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionTokenStore;

impl SessionTokenStore for FixtureSessionTokenStore {
    fn bind(&self, _token: &IdToken) {}

    fn clear(&self) {}
}
