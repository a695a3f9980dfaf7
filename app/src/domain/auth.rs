//! Authentication primitives: credentials, registration input, sessions and
//! the classification of identity provider failures.
//!
//! Keep form parsing outside the services by exposing constructors that
//! validate raw strings before anything talks to a port.

use std::fmt;

use serde::Serialize;
use serde_json::json;
use zeroize::Zeroizing;

use super::error::{Error, ErrorCode};
use super::password_strength::{PasswordStrength, StrengthLevel};
use super::user::{Email, UserId, UserRecord, UserValidationError, Username};

/// Domain error returned when sign-in or registration input is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was blank or malformed.
    Email(UserValidationError),
    /// Username was blank or malformed.
    Username(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password and confirmation differ.
    PasswordMismatch,
    /// Password does not meet the minimum strength.
    WeakPassword,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) | Self::Username(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordMismatch => write!(f, "password confirmation does not match"),
            Self::WeakPassword => write!(f, "password is too weak"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl AuthValidationError {
    /// Message rendered inline on the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Email(UserValidationError::EmptyEmail) => "Ingrese su correo electrónico.",
            Self::Email(_) => "El correo electrónico no es válido.",
            Self::Username(_) => "Ingrese un nombre de usuario válido.",
            Self::EmptyPassword => "Ingrese su contraseña.",
            Self::PasswordMismatch => "Las contraseñas no coinciden.",
            Self::WeakPassword => "La contraseña es demasiado débil.",
        }
    }
}

impl From<AuthValidationError> for Error {
    fn from(value: AuthValidationError) -> Self {
        let field = match &value {
            AuthValidationError::Email(_) => "email",
            AuthValidationError::Username(_) => "username",
            AuthValidationError::EmptyPassword | AuthValidationError::WeakPassword => "password",
            AuthValidationError::PasswordMismatch => "confirmation",
        };
        Error::invalid_request(value.user_message()).with_details(json!({
            "field": field,
            "reason": value.to_string(),
        }))
    }
}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `email` is a normalised [`Email`].
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use idozer::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("a@b.com", "Aa1!aaaa").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@b.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = Email::new(email).map_err(AuthValidationError::Email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration form.
///
/// Checks run in form order: username, email, confirmation, then strength.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    username: Username,
    credentials: LoginCredentials,
}

impl RegistrationRequest {
    /// Validate the raw registration fields.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, AuthValidationError> {
        let username = Username::new(username).map_err(AuthValidationError::Username)?;
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        if password != confirmation {
            return Err(AuthValidationError::PasswordMismatch);
        }
        if PasswordStrength::evaluate(password).level() == StrengthLevel::Weak {
            return Err(AuthValidationError::WeakPassword);
        }
        Ok(Self {
            username,
            credentials,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }
}

/// Classified identity provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureKind {
    InvalidEmail,
    WeakPassword,
    EmailAlreadyInUse,
    UserNotFound,
    WrongPassword,
    InvalidCredentials,
    UserDisabled,
    TooManyRequests,
    EmailNotVerified,
    NetworkFailure,
    MissingEmail,
    Unknown,
}

impl AuthFailureKind {
    /// Classify a provider error code.
    ///
    /// Accepts REST codes (`EMAIL_EXISTS`, `WEAK_PASSWORD : Password should
    /// be ...`) and SDK codes (`auth/email-already-in-use`).
    ///
    /// # Examples
    /// ```
    /// use idozer::domain::AuthFailureKind;
    ///
    /// assert_eq!(
    ///     AuthFailureKind::from_provider_code("WEAK_PASSWORD : too short"),
    ///     AuthFailureKind::WeakPassword,
    /// );
    /// assert_eq!(
    ///     AuthFailureKind::from_provider_code("auth/wrong-password"),
    ///     AuthFailureKind::WrongPassword,
    /// );
    /// ```
    pub fn from_provider_code(code: &str) -> Self {
        let code = code.trim();
        let code = code.split_whitespace().next().unwrap_or(code);
        match code {
            "INVALID_EMAIL" | "auth/invalid-email" => Self::InvalidEmail,
            "WEAK_PASSWORD" | "auth/weak-password" => Self::WeakPassword,
            "EMAIL_EXISTS" | "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" | "auth/user-not-found" => Self::UserNotFound,
            "INVALID_PASSWORD" | "auth/wrong-password" => Self::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "auth/invalid-credential" => Self::InvalidCredentials,
            "USER_DISABLED" | "auth/user-disabled" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" | "auth/too-many-requests" => Self::TooManyRequests,
            "auth/network-request-failed" => Self::NetworkFailure,
            "MISSING_EMAIL" | "auth/missing-email" => Self::MissingEmail,
            _ => Self::Unknown,
        }
    }

    /// Stable snake_case code placed in error details.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid_email",
            Self::WeakPassword => "weak_password",
            Self::EmailAlreadyInUse => "email_already_in_use",
            Self::UserNotFound => "user_not_found",
            Self::WrongPassword => "wrong_password",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserDisabled => "user_disabled",
            Self::TooManyRequests => "too_many_requests",
            Self::EmailNotVerified => "email_not_verified",
            Self::NetworkFailure => "network_failure",
            Self::MissingEmail => "missing_email",
            Self::Unknown => "unknown",
        }
    }

    /// Fixed message shown to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidEmail => "El correo electrónico no es válido.",
            Self::WeakPassword => "La contraseña debe tener al menos 6 caracteres.",
            Self::EmailAlreadyInUse => "El correo electrónico ya está en uso.",
            Self::UserNotFound => "No existe una cuenta con este correo electrónico.",
            Self::WrongPassword => "La contraseña es incorrecta.",
            Self::InvalidCredentials => "Correo electrónico o contraseña incorrectos.",
            Self::UserDisabled => "Esta cuenta ha sido deshabilitada.",
            Self::TooManyRequests => "Demasiados intentos. Inténtelo de nuevo más tarde.",
            Self::EmailNotVerified => {
                "Debe verificar su correo electrónico antes de iniciar sesión."
            }
            Self::NetworkFailure => "Error de conexión. Compruebe su conexión a internet.",
            Self::MissingEmail => "Ingrese su correo electrónico.",
            Self::Unknown => "Se produjo un error inesperado. Inténtelo de nuevo.",
        }
    }

    fn error_code(self) -> ErrorCode {
        match self {
            Self::InvalidEmail | Self::WeakPassword | Self::MissingEmail => {
                ErrorCode::InvalidRequest
            }
            Self::EmailAlreadyInUse => ErrorCode::Conflict,
            Self::UserNotFound => ErrorCode::NotFound,
            Self::WrongPassword | Self::InvalidCredentials | Self::EmailNotVerified => {
                ErrorCode::Unauthorized
            }
            Self::UserDisabled => ErrorCode::Forbidden,
            Self::TooManyRequests | Self::NetworkFailure => ErrorCode::ServiceUnavailable,
            Self::Unknown => ErrorCode::InternalError,
        }
    }

    /// Recover the failure kind carried by a domain error, if any.
    pub fn from_error(error: &Error) -> Option<Self> {
        let code = error.details()?.get("authFailure")?.as_str()?;
        ALL_KINDS.iter().copied().find(|kind| kind.code() == code)
    }
}

const ALL_KINDS: [AuthFailureKind; 12] = [
    AuthFailureKind::InvalidEmail,
    AuthFailureKind::WeakPassword,
    AuthFailureKind::EmailAlreadyInUse,
    AuthFailureKind::UserNotFound,
    AuthFailureKind::WrongPassword,
    AuthFailureKind::InvalidCredentials,
    AuthFailureKind::UserDisabled,
    AuthFailureKind::TooManyRequests,
    AuthFailureKind::EmailNotVerified,
    AuthFailureKind::NetworkFailure,
    AuthFailureKind::MissingEmail,
    AuthFailureKind::Unknown,
];

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<AuthFailureKind> for Error {
    fn from(kind: AuthFailureKind) -> Self {
        Error::new(kind.error_code(), kind.user_message())
            .with_details(json!({ "authFailure": kind.code() }))
    }
}

/// Bearer token issued by the identity provider.
///
/// `Debug` is redacted so tokens never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct IdToken(Zeroizing<String>);

impl IdToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdToken(<redacted>)")
    }
}

/// Signed-in session held by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: UserId,
    pub email: Email,
    pub email_verified: bool,
    pub id_token: IdToken,
}

/// Outcome of a successful registration.
///
/// The account always needs email verification before it can sign in;
/// `verification_email_sent` is false when the provider accepted the
/// account but the verification mail could not be requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub user: UserRecord,
    pub verification_email_sent: bool,
}

impl RegistrationOutcome {
    /// Registration always ends pending verification.
    pub fn is_verification_pending(&self) -> bool {
        true
    }
}
