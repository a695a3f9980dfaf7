//! Domain-level error type shared by every driving port.
//!
//! Screens show `message` inline or in a modal; `code` lets callers branch
//! without matching on (Spanish) text. Auth failures put their kind into
//! `details`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A form field or argument failed validation.
    InvalidRequest,
    /// No session, or the provider refused the credentials.
    Unauthorized,
    Forbidden,
    NotFound,
    /// The record already exists, e.g. a registered email.
    Conflict,
    /// The hosted backend or the device store could not be reached.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Generic user-facing text used when a caller supplies a blank message.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Revisa los datos introducidos",
            Self::Unauthorized => "Debes iniciar sesión",
            Self::Forbidden => "No tienes permiso para esta acción",
            Self::NotFound => "No se ha encontrado el registro",
            Self::Conflict => "El registro ya existe",
            Self::ServiceUnavailable => "Error de conexión, inténtalo más tarde",
            Self::InternalError => "Ha ocurrido un error inesperado",
        }
    }

    /// Whether repeating the same call later may succeed.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }
}

/// Error returned by the services.
///
/// ## Invariants
/// - `message` is never blank.
///
/// # Examples
/// ```
/// use idozer::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("recordatorio no encontrado");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::new(ErrorCode::Conflict, " ").message(), "El registro ya existe");
/// ```
#[derive(Debug, Clone, PartialEq, ThisError, Serialize, Deserialize)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
#[error("{message}")]
#[allow(clippy::error_impl_error, reason = "re-exported as `domain::Error` for callers")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Rejected wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Build an error; a blank `message` is replaced by
    /// [`ErrorCode::fallback_message`].
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            details: None,
        })
    }

    /// Build an error, refusing blank messages.
    ///
    /// # Errors
    ///
    /// [`ErrorValidationError::EmptyMessage`] when `message` is blank.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details, replacing any already present.
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(Error { code, message, details }: Error) -> Self {
        Self {
            code,
            message,
            details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(dto: ErrorDto) -> Result<Self, Self::Error> {
        let error = Self::try_new(dto.code, dto.message)?;
        Ok(match dto.details {
            Some(details) => error.with_details(details),
            None => error,
        })
    }
}
