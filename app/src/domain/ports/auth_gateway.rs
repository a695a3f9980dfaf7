//! Driving port for account use-cases.
//!
//! Screens call this port with already validated input; provider failures
//! come back as domain [`Error`]s whose details name the
//! [`AuthFailureKind`](crate::domain::AuthFailureKind).

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, RegistrationOutcome, RegistrationRequest};

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Create the identity and account record, then request verification.
    async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationOutcome, Error>;

    /// Sign in. Unverified accounts are signed straight back out.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Request a reset link for the raw `email` typed into the form.
    async fn reset_password(&self, email: &str) -> Result<(), Error>;

    /// Drop the current session, if any.
    async fn sign_out(&self);

    /// The signed-in session, if any.
    async fn current_session(&self) -> Option<AuthSession>;
}
