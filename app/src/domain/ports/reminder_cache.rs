//! Port for the on-device reminder list.
//!
//! The cache mirrors the remote collection as one serialised list. It is
//! refreshed after every successful remote read or write and consulted only
//! when the remote store fails.

use async_trait::async_trait;

use crate::domain::Reminder;

use super::define_port_error;

define_port_error! {
    /// Errors raised by reminder cache adapters.
    pub enum ReminderCacheError {
        /// Reading or writing device storage failed.
        Io { message: String } => "reminder cache i/o failed: {message}",
        /// The stored list could not be encoded or decoded.
        Serialization { message: String } => "reminder cache serialization failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderCache: Send + Sync {
    /// The cached list, or `None` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<Reminder>>, ReminderCacheError>;

    /// Replace the cached list, preserving order.
    async fn store(&self, reminders: &[Reminder]) -> Result<(), ReminderCacheError>;

    /// Forget the cached list.
    async fn clear(&self) -> Result<(), ReminderCacheError>;
}

/// Fixture cache that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReminderCache;

#[async_trait]
impl ReminderCache for FixtureReminderCache {
    async fn load(&self) -> Result<Option<Vec<Reminder>>, ReminderCacheError> {
        Ok(None)
    }

    async fn store(&self, _reminders: &[Reminder]) -> Result<(), ReminderCacheError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), ReminderCacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_cache_stays_empty() {
        let cache = FixtureReminderCache;
        cache.store(&[]).await.expect("store");
        assert!(cache.load().await.expect("load").is_none());
    }
}
