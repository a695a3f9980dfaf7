//! Identity provider that keeps accounts in memory.
//!
//! It answers with the same error codes as the hosted provider so the auth
//! service classification is exercised end to end.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use super::lock;
use crate::domain::ports::{IdentityProvider, IdentityProviderError, ProviderAccount};
use crate::domain::{Email, IdToken, LoginCredentials, UserId};

/// Shortest password the provider accepts.
const MIN_PROVIDER_PASSWORD_CHARS: usize = 6;

#[derive(Debug)]
struct Account {
    user_id: UserId,
    password: Zeroizing<String>,
    verified: bool,
    disabled: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Email, Account>,
    verification_requests: Vec<Email>,
    password_resets: Vec<Email>,
}

impl State {
    fn token_for(account: &Account) -> IdToken {
        IdToken::new(format!("memory-token-{}", account.user_id))
    }

    fn provider_account(email: &Email, account: &Account) -> ProviderAccount {
        ProviderAccount {
            user_id: account.user_id.clone(),
            email: email.clone(),
            email_verified: account.verified,
            id_token: Self::token_for(account),
        }
    }

    fn owner_of(&self, token: &IdToken) -> Option<Email> {
        self.accounts
            .iter()
            .find(|(_, account)| Self::token_for(account) == *token)
            .map(|(email, _)| email.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    state: Mutex<State>,
}

impl InMemoryIdentityProvider {
    /// Mark `email` as verified, as if the user followed the mailed link.
    /// Returns `false` for unknown accounts.
    pub fn verify_email(&self, email: &Email) -> bool {
        let mut state = lock(&self.state);
        let Some(account) = state.accounts.get_mut(email) else {
            return false;
        };
        account.verified = true;
        true
    }

    /// Disable `email`; later sign-ins fail with `USER_DISABLED`.
    pub fn disable(&self, email: &Email) -> bool {
        let mut state = lock(&self.state);
        let Some(account) = state.accounts.get_mut(email) else {
            return false;
        };
        account.disabled = true;
        true
    }

    /// Addresses that were sent a verification link, oldest first.
    pub fn verification_requests(&self) -> Vec<Email> {
        lock(&self.state).verification_requests.clone()
    }

    /// Addresses that were sent a password reset link, oldest first.
    pub fn password_resets(&self) -> Vec<Email> {
        lock(&self.state).password_resets.clone()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        if credentials.password().chars().count() < MIN_PROVIDER_PASSWORD_CHARS {
            return Err(IdentityProviderError::rejected(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }
        let mut state = lock(&self.state);
        let email = credentials.email();
        if state.accounts.contains_key(email) {
            return Err(IdentityProviderError::rejected("EMAIL_EXISTS"));
        }
        let account = Account {
            user_id: UserId::random(),
            password: Zeroizing::new(credentials.password().to_owned()),
            verified: false,
            disabled: false,
        };
        let created = State::provider_account(email, &account);
        state.accounts.insert(email.clone(), account);
        debug!(user_id = %created.user_id, "identity created");
        Ok(created)
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        let state = lock(&self.state);
        let email = credentials.email();
        let Some(account) = state.accounts.get(email) else {
            return Err(IdentityProviderError::rejected("EMAIL_NOT_FOUND"));
        };
        if account.disabled {
            return Err(IdentityProviderError::rejected("USER_DISABLED"));
        }
        if account.password.as_str() != credentials.password() {
            return Err(IdentityProviderError::rejected("INVALID_PASSWORD"));
        }
        Ok(State::provider_account(email, account))
    }

    async fn send_verification_email(
        &self,
        token: &IdToken,
    ) -> Result<(), IdentityProviderError> {
        let mut state = lock(&self.state);
        let email = state
            .owner_of(token)
            .ok_or_else(|| IdentityProviderError::rejected("INVALID_ID_TOKEN"))?;
        state.verification_requests.push(email);
        Ok(())
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError> {
        let mut state = lock(&self.state);
        if !state.accounts.contains_key(email) {
            return Err(IdentityProviderError::rejected("EMAIL_NOT_FOUND"));
        }
        state.password_resets.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::default()
    }

    fn creds(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn new_accounts_start_unverified(provider: InMemoryIdentityProvider) {
        let created = provider
            .sign_up(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect("sign up");
        assert!(!created.email_verified);

        provider
            .send_verification_email(&created.id_token)
            .await
            .expect("verification");
        assert_eq!(provider.verification_requests(), vec![created.email.clone()]);

        assert!(provider.verify_email(&created.email));
        let signed_in = provider
            .sign_in(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect("sign in");
        assert!(signed_in.email_verified);
        assert_eq!(signed_in.user_id, created.user_id);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_and_short_passwords_are_rejected(provider: InMemoryIdentityProvider) {
        provider
            .sign_up(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect("sign up");

        let duplicate = provider
            .sign_up(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect_err("duplicate");
        assert_eq!(duplicate, IdentityProviderError::rejected("EMAIL_EXISTS"));

        let weak = provider
            .sign_up(&creds("c@d.com", "abc"))
            .await
            .expect_err("weak");
        assert!(weak.to_string().contains("WEAK_PASSWORD"));
    }

    #[rstest]
    #[case("ghost@b.com", "Aa1!aaaa", "EMAIL_NOT_FOUND")]
    #[case("a@b.com", "wrong", "INVALID_PASSWORD")]
    #[tokio::test]
    async fn sign_in_failures_use_provider_codes(
        provider: InMemoryIdentityProvider,
        #[case] email: &str,
        #[case] password: &str,
        #[case] code: &str,
    ) {
        provider
            .sign_up(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect("sign up");
        let error = provider
            .sign_in(&creds(email, password))
            .await
            .expect_err("failure");
        assert_eq!(error, IdentityProviderError::rejected(code));
    }

    #[rstest]
    #[tokio::test]
    async fn disabled_accounts_cannot_sign_in(provider: InMemoryIdentityProvider) {
        let created = provider
            .sign_up(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect("sign up");
        assert!(provider.disable(&created.email));

        let error = provider
            .sign_in(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect_err("disabled");
        assert_eq!(error, IdentityProviderError::rejected("USER_DISABLED"));
    }

    #[rstest]
    #[tokio::test]
    async fn password_resets_require_a_known_account(provider: InMemoryIdentityProvider) {
        let email = Email::new("a@b.com").expect("email");
        let error = provider
            .send_password_reset(&email)
            .await
            .expect_err("unknown");
        assert_eq!(error, IdentityProviderError::rejected("EMAIL_NOT_FOUND"));

        provider
            .sign_up(&creds("a@b.com", "Aa1!aaaa"))
            .await
            .expect("sign up");
        provider.send_password_reset(&email).await.expect("reset");
        assert_eq!(provider.password_resets(), vec![email]);
    }
}
