//! DTOs for the identity toolkit REST payloads.
//!
//! Requests borrow from domain values; responses decode into these transport
//! shapes first and are then mapped into [`ProviderAccount`] in one pass.

use serde::{Deserialize, Serialize};

use crate::domain::ports::ProviderAccount;
use crate::domain::{Email, IdToken, UserId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LookupRequestDto<'a> {
    pub(super) id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OobCodeRequestDto<'a> {
    pub(super) request_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) id_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) email: Option<&'a str>,
}

impl<'a> OobCodeRequestDto<'a> {
    pub(super) fn verify_email(id_token: &'a str) -> Self {
        Self {
            request_type: "VERIFY_EMAIL",
            id_token: Some(id_token),
            email: None,
        }
    }

    pub(super) fn password_reset(email: &'a str) -> Self {
        Self {
            request_type: "PASSWORD_RESET",
            id_token: None,
            email: Some(email),
        }
    }
}

/// Body of `accounts:signUp` and `accounts:signInWithPassword` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthResponseDto {
    pub(super) local_id: String,
    pub(super) email: String,
    pub(super) id_token: String,
}

impl AuthResponseDto {
    pub(super) fn into_account(self, email_verified: bool) -> Result<ProviderAccount, String> {
        let user_id = UserId::new(&self.local_id)
            .map_err(|error| format!("localId {:?}: {error}", self.local_id))?;
        let email =
            Email::new(&self.email).map_err(|error| format!("email {:?}: {error}", self.email))?;
        Ok(ProviderAccount {
            user_id,
            email,
            email_verified,
            id_token: IdToken::new(self.id_token),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LookupResponseDto {
    #[serde(default)]
    pub(super) users: Vec<AccountInfoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountInfoDto {
    pub(super) local_id: String,
    #[serde(default)]
    pub(super) email_verified: bool,
}

impl LookupResponseDto {
    /// Verification flag for `local_id`, if the lookup returned that account.
    pub(super) fn email_verified_for(&self, local_id: &str) -> Option<bool> {
        self.users
            .iter()
            .find(|user| user.local_id == local_id)
            .map(|user| user.email_verified)
    }
}

/// Error envelope: `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) message: String,
}
