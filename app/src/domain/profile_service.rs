//! Profile service implementing the [`ProfileQuery`] and [`ProfileCommand`]
//! driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    ProfileCommand, ProfileQuery, ProfileRepository, ProfileRepositoryError, SaveProfileResponse,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Error, ProfileUpdate, UserId, UserProfile};

/// Profile service over the profile store and the account records.
#[derive(Clone)]
pub struct ProfileService<P, U> {
    profiles: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, U> ProfileService<P, U> {
    pub fn new(profiles: Arc<P>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles,
            users,
            clock,
        }
    }
}

impl<P, U> ProfileService<P, U>
where
    P: ProfileRepository,
    U: UserRepository,
{
    fn map_profile_error(error: ProfileRepositoryError) -> Error {
        match error {
            ProfileRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("profile store unavailable: {message}"))
            }
            ProfileRepositoryError::Unauthorized { message } => {
                Error::unauthorized(format!("profile store denied access: {message}"))
            }
            ProfileRepositoryError::Query { message } => {
                Error::internal(format!("profile store error: {message}"))
            }
        }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserPersistenceError::Unauthorized { message } => {
                Error::unauthorized(format!("user store denied access: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
        }
    }

    /// Existing profile, or a blank one seeded from the account record.
    async fn profile_or_seed(&self, owner: &UserId) -> Result<(UserProfile, bool), Error> {
        if let Some(profile) = self
            .profiles
            .find_by_owner(owner)
            .await
            .map_err(Self::map_profile_error)?
        {
            return Ok((profile, false));
        }
        let user = self
            .users
            .find_by_id(owner)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {owner} not found")))?;
        Ok((UserProfile::for_user(&user, self.clock.utc()), true))
    }

    /// Mirror a username change onto the account record.
    async fn sync_username(&self, profile: &UserProfile) -> Result<(), Error> {
        let Some(mut user) = self
            .users
            .find_by_id(&profile.owner)
            .await
            .map_err(Self::map_user_error)?
        else {
            warn!(user_id = %profile.owner, "profile has no account record to sync");
            return Ok(());
        };
        if user.username == profile.username {
            return Ok(());
        }
        user.username = profile.username.clone();
        self.users
            .upsert(&user)
            .await
            .map_err(Self::map_user_error)
    }
}

#[async_trait]
impl<P, U> ProfileQuery for ProfileService<P, U>
where
    P: ProfileRepository,
    U: UserRepository,
{
    async fn load(&self, owner: &UserId) -> Result<UserProfile, Error> {
        self.profiles
            .find_by_owner(owner)
            .await
            .map_err(Self::map_profile_error)?
            .ok_or_else(|| Error::not_found(format!("profile for {owner} not found")))
    }
}

#[async_trait]
impl<P, U> ProfileCommand for ProfileService<P, U>
where
    P: ProfileRepository,
    U: UserRepository,
{
    async fn save(
        &self,
        owner: &UserId,
        update: ProfileUpdate,
    ) -> Result<SaveProfileResponse, Error> {
        let (mut profile, created) = self.profile_or_seed(owner).await?;
        let today = self.clock.local().date_naive();
        profile.apply(&update, today, self.clock.utc())?;

        self.profiles
            .save(&profile)
            .await
            .map_err(Self::map_profile_error)?;
        if update.username.is_some() {
            self.sync_username(&profile).await?;
        }

        info!(user_id = %owner, created, "profile saved");
        Ok(SaveProfileResponse { profile, created })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{FixtureUserRepository, MockProfileRepository, MockUserRepository};
    use crate::domain::{Email, ErrorCode, Gender, UserRecord, Username};
    use crate::test_support::MutableClock;
    use chrono::{DateTime, NaiveDate, Utc};

    const NOW: &str = "2024-03-04 09:00";

    fn owner() -> UserId {
        UserId::new("uid1").expect("owner")
    }

    fn record(username: &str) -> UserRecord {
        UserRecord {
            id: owner(),
            username: Username::new(username).expect("username"),
            email: Email::new("ana@example.com").expect("email"),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn existing_profile() -> UserProfile {
        UserProfile::for_user(&record("Ana"), DateTime::<Utc>::UNIX_EPOCH)
    }

    fn make_service<U: UserRepository>(
        profiles: MockProfileRepository,
        users: U,
    ) -> ProfileService<MockProfileRepository, U> {
        ProfileService::new(Arc::new(profiles), Arc::new(users), MutableClock::shared(NOW))
    }

    #[tokio::test]
    async fn load_returns_stored_profile() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_owner()
            .return_once(|_| Ok(Some(existing_profile())));

        let service = make_service(profiles, FixtureUserRepository);
        let profile = service.load(&owner()).await.expect("loaded");

        assert_eq!(profile.username.as_ref(), "Ana");
    }

    #[tokio::test]
    async fn load_reports_missing_profile() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_find_by_owner().return_once(|_| Ok(None));

        let service = make_service(profiles, FixtureUserRepository);
        let error = service.load(&owner()).await.expect_err("missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn save_creates_profile_from_account_record() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_find_by_owner().return_once(|_| Ok(None));
        profiles
            .expect_save()
            .withf(|profile| profile.gender == Some(Gender::Other))
            .times(1)
            .return_once(|_| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Ok(Some(record("Ana"))));
        users.expect_upsert().never();

        let service = make_service(profiles, users);
        let update = ProfileUpdate {
            gender: Some(Some(Gender::Other)),
            ..ProfileUpdate::default()
        };
        let response = service.save(&owner(), update).await.expect("saved");

        assert!(response.created);
        assert_eq!(response.profile.email.as_ref(), "ana@example.com");
    }

    #[tokio::test]
    async fn save_writes_username_to_account_record() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_owner()
            .return_once(|_| Ok(Some(existing_profile())));
        profiles.expect_save().times(1).return_once(|_| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Ok(Some(record("Ana"))));
        users
            .expect_upsert()
            .withf(|user| user.username.as_ref() == "Ana María")
            .times(1)
            .return_once(|_| Ok(()));

        let service = make_service(profiles, users);
        let update = ProfileUpdate {
            username: Some(Username::new("Ana María").expect("username")),
            ..ProfileUpdate::default()
        };
        let response = service.save(&owner(), update).await.expect("saved");

        assert!(!response.created);
        assert_eq!(response.profile.username.as_ref(), "Ana María");
    }

    #[tokio::test]
    async fn save_rejects_email_change() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_owner()
            .return_once(|_| Ok(Some(existing_profile())));
        profiles.expect_save().never();

        let service = make_service(profiles, FixtureUserRepository);
        let update = ProfileUpdate {
            email: Some(Email::new("new@example.com").expect("email")),
            ..ProfileUpdate::default()
        };
        let error = service.save(&owner(), update).await.expect_err("immutable");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn save_rejects_birth_dates_after_today() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_owner()
            .return_once(|_| Ok(Some(existing_profile())));
        profiles.expect_save().never();

        let service = make_service(profiles, FixtureUserRepository);
        let update = ProfileUpdate {
            date_of_birth: Some(NaiveDate::from_ymd_opt(2024, 3, 5)),
            ..ProfileUpdate::default()
        };
        let error = service.save(&owner(), update).await.expect_err("future");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn save_without_account_record_is_not_found() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_find_by_owner().return_once(|_| Ok(None));
        profiles.expect_save().never();

        let service = make_service(profiles, FixtureUserRepository);
        let error = service
            .save(&owner(), ProfileUpdate::default())
            .await
            .expect_err("no account");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn save_maps_store_outage() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_owner()
            .return_once(|_| Err(ProfileRepositoryError::connection("offline")));

        let service = make_service(profiles, FixtureUserRepository);
        let error = service
            .save(&owner(), ProfileUpdate::default())
            .await
            .expect_err("offline");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn load_reports_refused_token_as_unauthorized() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_owner()
            .return_once(|_| Err(ProfileRepositoryError::unauthorized("status 401")));

        let service = make_service(profiles, FixtureUserRepository);
        let error = service.load(&owner()).await.expect_err("token refused");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }
}
