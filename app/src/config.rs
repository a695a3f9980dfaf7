//! Application settings loaded via OrthoConfig.
//!
//! Values come from `IDOZER_*` environment variables, configuration files or
//! command-line flags. Accessors apply defaults and validate on read so a
//! partially configured build can still run [`crate::App::in_memory`].

use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{AlarmDefaults, DEFAULT_ALARM_MESSAGE, DEFAULT_SNOOZE_MINUTES};
use crate::outbound::firebase::DEFAULT_IDENTITY_ENDPOINT;
use crate::telemetry::LogFormat;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_DIR: &str = ".idozer";

/// Invalid or missing settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("setting `{key}` is required")]
    Missing { key: &'static str },
    #[error("setting `{key}` is not a valid URL: {message}")]
    InvalidUrl { key: &'static str, message: String },
    #[error("cache directory {path:?} is not valid UTF-8")]
    NonUtf8Path { path: PathBuf },
    #[error("setting `log_format`: {message}")]
    InvalidLogFormat { message: String },
}

/// Settings for the hosted backend, the device cache and alarms.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IDOZER")]
pub struct AppSettings {
    /// Web API key of the Firebase project.
    pub firebase_api_key: Option<String>,
    /// Realtime database root, e.g. `https://<project>.firebaseio.com`.
    pub database_url: Option<String>,
    /// Identity toolkit endpoint override.
    pub identity_url: Option<String>,
    /// Per-request timeout for both HTTP clients.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
    /// Directory holding the on-device reminder list.
    pub cache_dir: Option<PathBuf>,
    /// `json` or `plain`.
    pub log_format: Option<String>,
    /// Snooze length attached to scheduled alarms.
    #[ortho_config(default = 1)]
    pub alarm_snooze_minutes: u32,
    /// Alarm text shown by the device.
    pub alarm_message: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|error| ConfigError::InvalidUrl {
        key,
        message: error.to_string(),
    })
}

impl AppSettings {
    /// The Firebase web API key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when unset or blank.
    pub fn firebase_api_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.firebase_api_key.as_ref()).ok_or(ConfigError::Missing {
            key: "firebase_api_key",
        })
    }

    /// The realtime database root URL.
    ///
    /// # Errors
    ///
    /// Fails when unset or not a URL.
    pub fn database_url(&self) -> Result<Url, ConfigError> {
        let raw = non_blank(self.database_url.as_ref()).ok_or(ConfigError::Missing {
            key: "database_url",
        })?;
        parse_url("database_url", raw)
    }

    /// The identity toolkit endpoint, defaulting to the public one.
    ///
    /// # Errors
    ///
    /// Fails when the override is not a URL.
    pub fn identity_url(&self) -> Result<Url, ConfigError> {
        let raw = non_blank(self.identity_url.as_ref()).unwrap_or(DEFAULT_IDENTITY_ENDPOINT);
        parse_url("identity_url", raw)
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = if self.request_timeout_secs == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECS
        } else {
            self.request_timeout_secs
        };
        Duration::from_secs(secs)
    }

    /// The cache directory, defaulting to `.idozer` in the working directory.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NonUtf8Path`] when the configured path is not UTF-8.
    pub fn cache_dir(&self) -> Result<Utf8PathBuf, ConfigError> {
        match &self.cache_dir {
            None => Ok(Utf8PathBuf::from(DEFAULT_CACHE_DIR)),
            Some(path) => Utf8PathBuf::from_path_buf(path.clone())
                .map_err(|path| ConfigError::NonUtf8Path { path }),
        }
    }

    /// The log format, defaulting to plain lines.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidLogFormat`] for unknown names.
    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        non_blank(self.log_format.as_ref()).map_or(Ok(LogFormat::default()), |raw| {
            raw.parse()
                .map_err(|message| ConfigError::InvalidLogFormat { message })
        })
    }

    /// Message and snooze length for scheduled alarms.
    pub fn alarm_defaults(&self) -> AlarmDefaults {
        AlarmDefaults {
            message: non_blank(self.alarm_message.as_ref())
                .unwrap_or(DEFAULT_ALARM_MESSAGE)
                .to_owned(),
            snooze_minutes: if self.alarm_snooze_minutes == 0 {
                DEFAULT_SNOOZE_MINUTES
            } else {
                self.alarm_snooze_minutes
            },
        }
    }
}
