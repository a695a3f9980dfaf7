//! Account service implementing the [`AuthGateway`] driving port.
//!
//! The service owns the in-process session and keeps the backend token in
//! [`SessionTokenStore`] in step with it. Provider error codes are classified
//! into [`AuthFailureKind`]s so screens only ever see the fixed user-facing
//! messages.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AuthGateway, IdentityProvider, IdentityProviderError, ProviderAccount, SessionTokenStore,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthFailureKind, AuthSession, AuthValidationError, Email, Error, LoginCredentials,
    RegistrationOutcome, RegistrationRequest, UserRecord,
};

/// Account service backed by an identity provider and the user store.
pub struct AuthService<P, U, T> {
    provider: Arc<P>,
    users: Arc<U>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    session: Mutex<Option<AuthSession>>,
}

impl<P, U, T> AuthService<P, U, T> {
    pub fn new(provider: Arc<P>, users: Arc<U>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            users,
            tokens,
            clock,
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<AuthSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P, U, T> AuthService<P, U, T>
where
    P: IdentityProvider,
    U: UserRepository,
    T: SessionTokenStore,
{
    /// Point the backend token back at the current session, if any.
    fn restore_session_token(&self) {
        let token = self.session().as_ref().map(|session| session.id_token.clone());
        match token {
            Some(token) => self.tokens.bind(&token),
            None => self.tokens.clear(),
        }
    }

    /// Drop the session and the backend token together.
    fn end_session(&self) -> Option<AuthSession> {
        let ended = self.session().take();
        self.tokens.clear();
        ended
    }

    fn map_provider_error(error: IdentityProviderError) -> Error {
        let kind = match &error {
            IdentityProviderError::Rejected { code } => AuthFailureKind::from_provider_code(code),
            IdentityProviderError::Transport { .. } => AuthFailureKind::NetworkFailure,
            IdentityProviderError::Decode { .. } => AuthFailureKind::Unknown,
        };
        if kind == AuthFailureKind::Unknown {
            warn!(%error, "unclassified identity provider failure");
        }
        kind.into()
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserPersistenceError::Unauthorized { message } => {
                Error::unauthorized(format!("user store denied access: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
        }
    }

    fn user_record(&self, request: &RegistrationRequest, account: &ProviderAccount) -> UserRecord {
        UserRecord {
            id: account.user_id.clone(),
            username: request.username().clone(),
            email: account.email.clone(),
            created_at: self.clock.utc(),
        }
    }
}

#[async_trait]
impl<P, U, T> AuthGateway for AuthService<P, U, T>
where
    P: IdentityProvider,
    U: UserRepository,
    T: SessionTokenStore,
{
    async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationOutcome, Error> {
        let account = self
            .provider
            .sign_up(request.credentials())
            .await
            .map_err(Self::map_provider_error)?;

        let user = self.user_record(request, &account);
        self.tokens.bind(&account.id_token);
        let stored = self.users.upsert(&user).await;
        self.restore_session_token();
        stored.map_err(Self::map_user_error)?;

        let verification_email_sent =
            match self.provider.send_verification_email(&account.id_token).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(user_id = %user.id, %error, "verification email could not be requested");
                    false
                }
            };

        info!(user_id = %user.id, verification_email_sent, "account registered");
        Ok(RegistrationOutcome {
            user,
            verification_email_sent,
        })
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let account = match self.provider.sign_in(credentials).await {
            Ok(account) => account,
            Err(error) => {
                self.end_session();
                return Err(Self::map_provider_error(error));
            }
        };

        if !account.email_verified {
            self.end_session();
            info!(user_id = %account.user_id, "sign-in blocked until email is verified");
            return Err(AuthFailureKind::EmailNotVerified.into());
        }

        let session = AuthSession {
            user_id: account.user_id,
            email: account.email,
            email_verified: true,
            id_token: account.id_token,
        };
        self.tokens.bind(&session.id_token);
        *self.session() = Some(session.clone());
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    async fn reset_password(&self, email: &str) -> Result<(), Error> {
        if email.trim().is_empty() {
            return Err(AuthFailureKind::MissingEmail.into());
        }
        let email = Email::new(email).map_err(AuthValidationError::Email)?;
        self.provider
            .send_password_reset(&email)
            .await
            .map_err(Self::map_provider_error)?;
        info!("password reset requested");
        Ok(())
    }

    async fn sign_out(&self) {
        if let Some(session) = self.end_session() {
            info!(user_id = %session.user_id, "signed out");
        }
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.session().clone()
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
