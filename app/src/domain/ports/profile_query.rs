//! Driving port for reading a profile.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserProfile};

#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Profile keyed by `owner`; `not_found` when none was saved.
    async fn load(&self, owner: &UserId) -> Result<UserProfile, Error>;
}
