//! Driven port for the hosted identity provider.
//!
//! Adapters translate provider responses into [`ProviderAccount`] values and
//! surface provider error codes verbatim in
//! [`IdentityProviderError::Rejected`]; classification into user-facing
//! failures happens in the auth service.

use async_trait::async_trait;

use crate::domain::{Email, IdToken, LoginCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused the request with an error code.
        Rejected { code: String } => "identity provider rejected request: {code}",
        /// The provider could not be reached.
        Transport { message: String } => "identity provider unreachable: {message}",
        /// The provider answered with an unexpected payload.
        Decode { message: String } => "identity provider response malformed: {message}",
    }
}

/// Account returned by sign-up and sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAccount {
    pub user_id: UserId,
    pub email: Email,
    pub email_verified: bool,
    pub id_token: IdToken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity for `credentials`. New identities are unverified.
    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError>;

    /// Authenticate `credentials`, reporting the verification state.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError>;

    /// Ask the provider to mail a verification link to the token's owner.
    async fn send_verification_email(&self, token: &IdToken)
    -> Result<(), IdentityProviderError>;

    /// Ask the provider to mail a password reset link.
    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError>;
}

/// Fixture provider that accepts everything.
///
/// Sign-up yields a fresh unverified account; sign-in yields a verified one.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

impl FixtureIdentityProvider {
    fn account(credentials: &LoginCredentials, email_verified: bool) -> ProviderAccount {
        ProviderAccount {
            user_id: UserId::random(),
            email: credentials.email().clone(),
            email_verified,
            id_token: IdToken::new("fixture-token"),
        }
    }
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        Ok(Self::account(credentials, false))
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        Ok(Self::account(credentials, true))
    }

    async fn send_verification_email(
        &self,
        _token: &IdToken,
    ) -> Result<(), IdentityProviderError> {
        Ok(())
    }

    async fn send_password_reset(&self, _email: &Email) -> Result<(), IdentityProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_sign_up_is_unverified() {
        let creds = LoginCredentials::try_from_parts("a@b.com", "Aa1!aaaa").expect("creds");
        let account = FixtureIdentityProvider
            .sign_up(&creds)
            .await
            .expect("fixture sign up");
        assert!(!account.email_verified);
        assert_eq!(account.email.as_ref(), "a@b.com");
    }

    #[tokio::test]
    async fn fixture_sign_in_is_verified() {
        let creds = LoginCredentials::try_from_parts("a@b.com", "Aa1!aaaa").expect("creds");
        let account = FixtureIdentityProvider
            .sign_in(&creds)
            .await
            .expect("fixture sign in");
        assert!(account.email_verified);
    }

    #[test]
    fn rejected_errors_keep_the_provider_code() {
        let err = IdentityProviderError::rejected("EMAIL_EXISTS");
        assert!(err.to_string().ends_with("EMAIL_EXISTS"));
    }
}
