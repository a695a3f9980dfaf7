//! User record repository over the `users` collection.

use std::sync::Arc;

use async_trait::async_trait;

use super::database::{DatabaseError, RealtimeDatabaseClient};
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{UserId, UserRecord};

const COLLECTION: &str = "users";

impl From<DatabaseError> for UserPersistenceError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Unauthorized { message } => Self::unauthorized(message),
            other if other.is_connectivity() => Self::connection(other.to_string()),
            other => Self::query(other.to_string()),
        }
    }
}

/// User records stored as `users/{uid}`.
pub struct FirebaseUserRepository {
    database: Arc<RealtimeDatabaseClient>,
}

impl FirebaseUserRepository {
    pub fn new(database: Arc<RealtimeDatabaseClient>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl UserRepository for FirebaseUserRepository {
    async fn upsert(&self, user: &UserRecord) -> Result<(), UserPersistenceError> {
        Ok(self
            .database
            .put(&format!("{COLLECTION}/{}", user.id), user)
            .await?)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        Ok(self.database.get(&format!("{COLLECTION}/{id}")).await?)
    }
}
