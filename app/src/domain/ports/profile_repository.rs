//! Port for profile persistence, keyed directly by owner id.

use async_trait::async_trait;

use crate::domain::{UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// The store could not be reached.
        Connection { message: String } => "profile store connection failed: {message}",
        /// The store refused the session token.
        Unauthorized { message: String } => "profile store denied access: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } => "profile store query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Profile stored under `profiles/{owner}`.
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<UserProfile>, ProfileRepositoryError>;

    /// Create or replace the owner's profile.
    async fn save(&self, profile: &UserProfile) -> Result<(), ProfileRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileRepository;

#[async_trait]
impl ProfileRepository for FixtureProfileRepository {
    async fn find_by_owner(
        &self,
        _owner: &UserId,
    ) -> Result<Option<UserProfile>, ProfileRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _profile: &UserProfile) -> Result<(), ProfileRepositoryError> {
        Ok(())
    }
}
