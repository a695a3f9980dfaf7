//! Reqwest-backed identity toolkit adapter.
//!
//! This adapter owns transport details only: request serialisation, the API
//! key, timeout and HTTP error mapping. Provider error codes are passed
//! through verbatim as [`IdentityProviderError::Rejected`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{
    AuthResponseDto, ErrorEnvelopeDto, LookupRequestDto, LookupResponseDto, OobCodeRequestDto,
    PasswordRequestDto,
};
use super::http::{body_preview, with_trailing_slash};
use crate::domain::ports::{IdentityProvider, IdentityProviderError, ProviderAccount};
use crate::domain::{Email, IdToken, LoginCredentials};

/// Public identity toolkit endpoint.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Identity provider adapter over the identity toolkit `accounts:*` actions.
pub struct FirebaseIdentityProvider {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl FirebaseIdentityProvider {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: with_trailing_slash(endpoint),
            api_key: Zeroizing::new(api_key.into()),
        })
    }

    fn action_url(&self, action: &str) -> Result<Url, IdentityProviderError> {
        // A bare `accounts:x` would parse as a URL with scheme `accounts`.
        let mut url = self
            .endpoint
            .join(&format!("./accounts:{action}"))
            .map_err(|error| {
                IdentityProviderError::transport(format!("invalid endpoint for {action}: {error}"))
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn call<B, R>(&self, action: &str, body: &B) -> Result<R, IdentityProviderError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.action_url(action)?)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(action, "identity provider call succeeded");

        serde_json::from_slice(body.as_ref()).map_err(|error| {
            IdentityProviderError::decode(format!("invalid {action} payload: {error}"))
        })
    }

    async fn password_call(
        &self,
        action: &str,
        credentials: &LoginCredentials,
    ) -> Result<AuthResponseDto, IdentityProviderError> {
        let request = PasswordRequestDto {
            email: credentials.email().as_ref(),
            password: credentials.password(),
            return_secure_token: true,
        };
        self.call(action, &request).await
    }

    async fn email_verified(&self, auth: &AuthResponseDto) -> Result<bool, IdentityProviderError> {
        let lookup: LookupResponseDto = self
            .call(
                "lookup",
                &LookupRequestDto {
                    id_token: &auth.id_token,
                },
            )
            .await?;
        lookup.email_verified_for(&auth.local_id).ok_or_else(|| {
            IdentityProviderError::decode(format!("lookup omitted account {}", auth.local_id))
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        let auth = self.password_call("signUp", credentials).await?;
        auth.into_account(false)
            .map_err(IdentityProviderError::decode)
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        let auth = self.password_call("signInWithPassword", credentials).await?;
        let verified = self.email_verified(&auth).await?;
        auth.into_account(verified)
            .map_err(IdentityProviderError::decode)
    }

    async fn send_verification_email(
        &self,
        token: &IdToken,
    ) -> Result<(), IdentityProviderError> {
        let _: IgnoredAny = self
            .call("sendOobCode", &OobCodeRequestDto::verify_email(token.expose()))
            .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError> {
        let _: IgnoredAny = self
            .call(
                "sendOobCode",
                &OobCodeRequestDto::password_reset(email.as_ref()),
            )
            .await?;
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::transport(format!("timed out: {error}"))
    } else {
        IdentityProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        return IdentityProviderError::rejected(envelope.error.message);
    }

    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };
    if status.is_server_error()
        || matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT
        )
    {
        IdentityProviderError::transport(message)
    } else {
        IdentityProviderError::decode(message)
    }
}
