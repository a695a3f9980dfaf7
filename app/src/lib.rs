//! Medication reminder core library.
//!
//! The crate is a small hexagon: [`domain`] owns the reminder, profile and
//! account types together with the services and ports that drive them;
//! [`outbound`] provides the adapters for the hosted identity provider, the
//! realtime database, the on-device cache and the alarm scheduler. [`App`]
//! is the composition root that screens talk to.

pub mod app;
pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{App, AppBuildError, InMemoryBackends};
pub use config::AppSettings;
