//! Tracing subscriber setup.

use std::fmt;
use std::str::FromStr;

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt as subscriber};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    #[default]
    Plain,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "plain" | "pretty" | "text" => Ok(Self::Plain),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Install the global subscriber, filtered by `RUST_LOG`.
///
/// A second initialisation is logged and otherwise ignored.
pub fn init_tracing(format: LogFormat) {
    let builder = subscriber().with_env_filter(EnvFilter::from_default_env());
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
