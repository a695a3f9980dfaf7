//! Realtime database REST client shared by the Firebase repositories.
//!
//! Every node is addressed as `{base}/{path}.json`. When a session token is
//! present it is appended as the `auth` query parameter; the token is never
//! logged.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::http::{body_preview, with_trailing_slash};
use crate::domain::IdToken;
use crate::domain::ports::SessionTokenStore;

/// Characters the database refuses inside a key.
const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

/// Failures raised by [`RealtimeDatabaseClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("database request timed out: {message}")]
    Timeout { message: String },
    #[error("database unreachable: {message}")]
    Transport { message: String },
    #[error("database denied access: {message}")]
    Unauthorized { message: String },
    #[error("database rejected request: {message}")]
    Rejected { message: String },
    #[error("invalid database path: {message}")]
    InvalidPath { message: String },
    #[error("database payload could not be encoded: {message}")]
    Encode { message: String },
    #[error("database payload malformed: {message}")]
    Decode { message: String },
}

impl DatabaseError {
    /// Whether the failure means the database could not be reached.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

/// Minimal GET/PUT/PATCH/DELETE client for one database instance.
pub struct RealtimeDatabaseClient {
    client: Client,
    base_url: Url,
    auth_token: RwLock<Option<IdToken>>,
}

impl RealtimeDatabaseClient {
    /// Build a client using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            auth_token: RwLock::new(None),
        })
    }

    /// Authenticate subsequent requests as the signed-in user.
    pub fn set_auth_token(&self, token: IdToken) {
        *self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear_auth_token(&self) {
        *self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Read the node at `path`; `None` when the node does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] on transport, status or decode failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, DatabaseError> {
        let body = self.send(Method::GET, path, None).await?;
        serde_json::from_slice(&body).map_err(|error| DatabaseError::Decode {
            message: format!("{path}: {error}"),
        })
    }

    /// Replace the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] on encode, transport or status failures.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<(), DatabaseError> {
        let body = encode(path, value)?;
        self.send(Method::PUT, path, Some(body)).await.map(drop)
    }

    /// Overwrite the named children of `path`; `null` children are removed.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] on encode, transport or status failures.
    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<(), DatabaseError> {
        let body = encode(path, value)?;
        self.send(Method::PATCH, path, Some(body)).await.map(drop)
    }

    /// Remove the node at `path`. Removing a missing node succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] on transport or status failures.
    pub async fn delete(&self, path: &str) -> Result<(), DatabaseError> {
        self.send(Method::DELETE, path, None).await.map(drop)
    }

    fn resource_url(&self, path: &str) -> Result<Url, DatabaseError> {
        validate_path(path)?;
        let mut url = self
            .base_url
            .join(&format!("{path}.json"))
            .map_err(|error| DatabaseError::InvalidPath {
                message: format!("{path}: {error}"),
            })?;
        if let Some(token) = self
            .auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            url.query_pairs_mut().append_pair("auth", token.expose());
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, DatabaseError> {
        let url = self.resource_url(path)?;
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(%method, path, bytes = body.len(), "database request succeeded");
        Ok(body.to_vec())
    }
}

fn encode<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<Vec<u8>, DatabaseError> {
    serde_json::to_vec(value).map_err(|error| DatabaseError::Encode {
        message: format!("{path}: {error}"),
    })
}

fn validate_path(path: &str) -> Result<(), DatabaseError> {
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(DatabaseError::InvalidPath {
                message: format!("{path:?} contains an empty segment"),
            });
        }
        if segment.contains(FORBIDDEN_KEY_CHARS) {
            return Err(DatabaseError::InvalidPath {
                message: format!("{path:?} contains a reserved character"),
            });
        }
    }
    Ok(())
}

fn map_transport_error(error: reqwest::Error) -> DatabaseError {
    let message = error.to_string();
    if error.is_timeout() {
        DatabaseError::Timeout { message }
    } else {
        DatabaseError::Transport { message }
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DatabaseError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DatabaseError::Unauthorized { message },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DatabaseError::Timeout { message }
        }
        StatusCode::TOO_MANY_REQUESTS => DatabaseError::Transport { message },
        _ if status.is_client_error() => DatabaseError::Rejected { message },
        _ => DatabaseError::Transport { message },
    }
}

impl SessionTokenStore for RealtimeDatabaseClient {
    fn bind(&self, token: &IdToken) {
        self.set_auth_token(token.clone());
    }

    fn clear(&self) {
        self.clear_auth_token();
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network database helpers.

    use super::*;
    use rstest::rstest;

    fn client() -> RealtimeDatabaseClient {
        RealtimeDatabaseClient::new(
            Url::parse("https://idozer-demo.firebaseio.com").expect("url"),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[test]
    fn anonymous_urls_have_no_query() {
        let url = client().resource_url("reminders/abc").expect("url");
        assert_eq!(
            url.as_str(),
            "https://idozer-demo.firebaseio.com/reminders/abc.json"
        );
    }

    #[test]
    fn token_is_appended_and_cleared() {
        let client = client();
        client.set_auth_token(IdToken::new("tok"));
        assert!(client.has_auth_token());
        let url = client.resource_url("users/uid1").expect("url");
        assert_eq!(url.query(), Some("auth=tok"));

        client.clear_auth_token();
        assert!(!client.has_auth_token());
        let url = client.resource_url("users/uid1").expect("url");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn session_tokens_drive_the_auth_parameter() {
        let client = client();
        SessionTokenStore::bind(&client, &IdToken::new("signup-token"));
        let url = client.resource_url("users/uid1").expect("url");
        assert_eq!(url.query(), Some("auth=signup-token"));

        SessionTokenStore::clear(&client);
        assert!(!client.has_auth_token());
    }

    #[rstest]
    #[case("")]
    #[case("reminders//abc")]
    #[case("reminders/a.b")]
    #[case("profiles/$uid")]
    #[case("users/[0]")]
    fn rejects_invalid_paths(#[case] path: &str) {
        let error = client().resource_url(path).expect_err("invalid path");
        assert!(matches!(error, DatabaseError::InvalidPath { .. }));
    }

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Unauthorized")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::server_error(StatusCode::SERVICE_UNAVAILABLE, "Transport")]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, br#"{ "error" : "Permission denied" }"#);
        let actual = match error {
            DatabaseError::Unauthorized { .. } => "Unauthorized",
            DatabaseError::Timeout { .. } => "Timeout",
            DatabaseError::Rejected { .. } => "Rejected",
            DatabaseError::Transport { .. } => "Transport",
            _ => "other",
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn connectivity_failures_are_flagged() {
        assert!(
            DatabaseError::Timeout {
                message: "slow".to_owned()
            }
            .is_connectivity()
        );
        assert!(
            !DatabaseError::Rejected {
                message: "bad".to_owned()
            }
            .is_connectivity()
        );
    }
}
