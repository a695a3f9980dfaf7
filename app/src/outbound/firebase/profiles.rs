//! Profile repository over the `profiles` collection, keyed by owner id.

use std::sync::Arc;

use async_trait::async_trait;

use super::database::{DatabaseError, RealtimeDatabaseClient};
use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{UserId, UserProfile};

const COLLECTION: &str = "profiles";

impl From<DatabaseError> for ProfileRepositoryError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Unauthorized { message } => Self::unauthorized(message),
            other if other.is_connectivity() => Self::connection(other.to_string()),
            other => Self::query(other.to_string()),
        }
    }
}

/// Profiles stored as `profiles/{ownerId}`.
pub struct FirebaseProfileRepository {
    database: Arc<RealtimeDatabaseClient>,
}

impl FirebaseProfileRepository {
    pub fn new(database: Arc<RealtimeDatabaseClient>) -> Self {
        Self { database }
    }

    fn path(owner: &UserId) -> String {
        format!("{COLLECTION}/{owner}")
    }
}

#[async_trait]
impl ProfileRepository for FirebaseProfileRepository {
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<UserProfile>, ProfileRepositoryError> {
        Ok(self.database.get(&Self::path(owner)).await?)
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), ProfileRepositoryError> {
        Ok(self
            .database
            .put(&Self::path(&profile.owner), profile)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn profiles_are_keyed_by_owner() {
        let owner = UserId::new("uid-42").expect("owner");
        assert_eq!(FirebaseProfileRepository::path(&owner), "profiles/uid-42");
    }

    #[test]
    fn outages_map_to_connection_errors() {
        let error = ProfileRepositoryError::from(DatabaseError::Timeout {
            message: "slow".to_owned(),
        });
        assert!(matches!(error, ProfileRepositoryError::Connection { .. }));
    }

    #[test]
    fn refused_tokens_map_to_unauthorized() {
        let error = ProfileRepositoryError::from(DatabaseError::Unauthorized {
            message: "status 401: Auth token is expired".to_owned(),
        });
        assert_eq!(
            error,
            ProfileRepositoryError::unauthorized("status 401: Auth token is expired")
        );
    }
}
