//! Keyed stores for account records and profiles.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{
    ProfileRepository, ProfileRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{UserId, UserProfile, UserRecord};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert(&self, user: &UserRecord) -> Result<(), UserPersistenceError> {
        lock(&self.users).insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        Ok(lock(&self.users).get(id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<UserId, UserProfile>>,
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<UserProfile>, ProfileRepositoryError> {
        Ok(lock(&self.profiles).get(owner).cloned())
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), ProfileRepositoryError> {
        lock(&self.profiles).insert(profile.owner.clone(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{Email, Username};
    use chrono::{DateTime, Utc};

    fn record() -> UserRecord {
        UserRecord {
            id: UserId::new("uid1").expect("id"),
            username: Username::new("Ana").expect("username"),
            email: Email::new("ana@example.com").expect("email"),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn users_are_upserted_by_id() {
        let repo = InMemoryUserRepository::default();
        let mut user = record();
        repo.upsert(&user).await.expect("insert");
        user.username = Username::new("Ana María").expect("username");
        repo.upsert(&user).await.expect("update");

        let found = repo.find_by_id(&user.id).await.expect("find");
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn profiles_are_keyed_by_owner() {
        let repo = InMemoryProfileRepository::default();
        let profile = UserProfile::for_user(&record(), DateTime::<Utc>::UNIX_EPOCH);
        repo.save(&profile).await.expect("save");

        let other = UserId::new("uid2").expect("id");
        assert_eq!(repo.find_by_owner(&other).await.expect("find"), None);
        assert_eq!(
            repo.find_by_owner(&profile.owner).await.expect("find"),
            Some(profile)
        );
    }
}
