//! Composition root.
//!
//! [`App`] wires adapters into the domain services and exposes the
//! operations the screens call. Screens pass raw form input; parsing into
//! domain values happens here so validation errors come back as domain
//! [`Error`]s with user-facing messages.

use std::sync::{Arc, Mutex, PoisonError};

use mockable::{Clock, DefaultClock};
use thiserror::Error as ThisError;
use tokio::sync::mpsc::Receiver;
use tracing::info;

use crate::config::{AppSettings, ConfigError};
use crate::domain::ports::{
    AuthGateway, ProfileCommand, ProfileQuery, ReminderCacheError, ReminderCommand,
    ReminderCreated, ReminderQuery, SaveProfileResponse,
};
use crate::domain::{
    AlarmRequest, AuthService, AuthSession, DayKey, DayPicker, DisplayTheme, Error,
    LoginCredentials, PasswordStrength, ProfileService, ProfileUpdate, RegistrationOutcome,
    RegistrationRequest, Reminder, ReminderDetails, ReminderId, ReminderPatch, ReminderService,
    UserId, UserProfile,
};
use crate::outbound::device::{ChannelAlarmScheduler, FileReminderCache};
use crate::outbound::firebase::{
    FirebaseIdentityProvider, FirebaseProfileRepository, FirebaseReminderRepository,
    FirebaseUserRepository, RealtimeDatabaseClient,
};
use crate::outbound::memory::{
    InMemoryIdentityProvider, InMemoryProfileRepository, InMemoryReminderCache,
    InMemoryReminderRepository, InMemorySessionTokens, InMemoryUserRepository,
    RecordingAlarmScheduler,
};

/// Failures while wiring [`App::from_settings`].
#[derive(Debug, ThisError)]
pub enum AppBuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client could not be built: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Cache(#[from] ReminderCacheError),
}

/// In-process backends behind [`App::over_memory`].
///
/// Holding on to them lets callers verify accounts, take the reminder store
/// offline or inspect scheduled alarms.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackends {
    pub identity: Arc<InMemoryIdentityProvider>,
    pub users: Arc<InMemoryUserRepository>,
    pub reminders: Arc<InMemoryReminderRepository>,
    pub cache: Arc<InMemoryReminderCache>,
    pub alarms: Arc<RecordingAlarmScheduler>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub sessions: Arc<InMemorySessionTokens>,
}

/// Screen-facing entry point over the driving ports.
pub struct App {
    auth: Arc<dyn AuthGateway>,
    reminder_commands: Arc<dyn ReminderCommand>,
    reminder_queries: Arc<dyn ReminderQuery>,
    profile_commands: Arc<dyn ProfileCommand>,
    profile_queries: Arc<dyn ProfileQuery>,
    alarm_feed: Mutex<Option<Receiver<AlarmRequest>>>,
    clock: Arc<dyn Clock>,
}

impl App {
    /// Wire the Firebase, device cache and alarm channel adapters.
    ///
    /// # Errors
    ///
    /// Fails on missing or malformed settings, when an HTTP client cannot be
    /// built, or when the cache directory cannot be opened.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, AppBuildError> {
        let timeout = settings.request_timeout();
        let identity = Arc::new(FirebaseIdentityProvider::new(
            settings.identity_url()?,
            settings.firebase_api_key()?,
            timeout,
        )?);
        let database = Arc::new(RealtimeDatabaseClient::new(
            settings.database_url()?,
            timeout,
        )?);
        let cache = Arc::new(FileReminderCache::open(&settings.cache_dir()?)?);
        let (alarms, feed) = ChannelAlarmScheduler::channel();
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

        let auth = Arc::new(AuthService::new(
            identity,
            Arc::new(FirebaseUserRepository::new(Arc::clone(&database))),
            Arc::clone(&database),
            Arc::clone(&clock),
        ));
        let reminders = Arc::new(
            ReminderService::new(
                Arc::new(FirebaseReminderRepository::new(Arc::clone(&database))),
                cache,
                Arc::new(alarms),
                Arc::clone(&clock),
            )
            .with_alarm_defaults(settings.alarm_defaults()),
        );
        let profiles = Arc::new(ProfileService::new(
            Arc::new(FirebaseProfileRepository::new(Arc::clone(&database))),
            Arc::new(FirebaseUserRepository::new(database)),
            Arc::clone(&clock),
        ));

        info!("app wired against firebase");
        Ok(Self {
            auth,
            reminder_commands: reminders.clone(),
            reminder_queries: reminders,
            profile_commands: profiles.clone(),
            profile_queries: profiles,
            alarm_feed: Mutex::new(Some(feed)),
            clock,
        })
    }

    /// Wire fresh in-process backends.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::over_memory(&InMemoryBackends::default(), clock)
    }

    /// Wire the given in-process backends.
    pub fn over_memory(backends: &InMemoryBackends, clock: Arc<dyn Clock>) -> Self {
        let auth = Arc::new(AuthService::new(
            Arc::clone(&backends.identity),
            Arc::clone(&backends.users),
            Arc::clone(&backends.sessions),
            Arc::clone(&clock),
        ));
        let reminders = Arc::new(ReminderService::new(
            Arc::clone(&backends.reminders),
            Arc::clone(&backends.cache),
            Arc::clone(&backends.alarms),
            Arc::clone(&clock),
        ));
        let profiles = Arc::new(ProfileService::new(
            Arc::clone(&backends.profiles),
            Arc::clone(&backends.users),
            Arc::clone(&clock),
        ));

        Self {
            auth,
            reminder_commands: reminders.clone(),
            reminder_queries: reminders,
            profile_commands: profiles.clone(),
            profile_queries: profiles,
            alarm_feed: Mutex::new(None),
            clock,
        }
    }

    /// Receiver of alarm requests for the platform layer; `Some` only once,
    /// and only for [`App::from_settings`].
    pub fn take_alarm_feed(&self) -> Option<Receiver<AlarmRequest>> {
        self.alarm_feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    // --- accounts ---

    /// Validate the registration form and create the account.
    ///
    /// # Errors
    ///
    /// Validation failures are `invalid_request`; provider failures carry an
    /// [`crate::domain::AuthFailureKind`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<RegistrationOutcome, Error> {
        let request = RegistrationRequest::try_from_parts(username, email, password, confirmation)?;
        self.auth.register(&request).await
    }

    /// Sign in; database requests are authenticated as the new session.
    /// A failed attempt ends any earlier session.
    ///
    /// # Errors
    ///
    /// Fails for invalid input, provider rejections and unverified emails.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, Error> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        self.auth.login(&credentials).await
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Fails for a blank or unknown email.
    pub async fn reset_password(&self, email: &str) -> Result<(), Error> {
        self.auth.reset_password(email).await
    }

    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
    }

    pub async fn current_session(&self) -> Option<AuthSession> {
        self.auth.current_session().await
    }

    /// Strength meter for the registration form.
    pub fn password_strength(password: &str) -> PasswordStrength {
        PasswordStrength::evaluate(password)
    }


    async fn signed_in_user(&self) -> Result<UserId, Error> {
        self.current_session()
            .await
            .map(|session| session.user_id)
            .ok_or_else(|| Error::unauthorized("sign in to manage your profile"))
    }

    // --- reminders ---

    /// Store a new reminder and schedule its first alarm.
    ///
    /// # Errors
    ///
    /// Fails when the remote store rejects the write.
    pub async fn create_reminder(&self, details: ReminderDetails) -> Result<ReminderCreated, Error> {
        self.reminder_commands.create(details).await
    }

    /// # Errors
    ///
    /// Fails for an empty patch, an unknown id or a remote failure.
    pub async fn update_reminder(
        &self,
        id: &ReminderId,
        patch: ReminderPatch,
    ) -> Result<Reminder, Error> {
        self.reminder_commands.update(id, patch).await
    }

    /// # Errors
    ///
    /// Fails for an unknown id or a remote failure.
    pub async fn delete_reminder(&self, id: &ReminderId) -> Result<(), Error> {
        self.reminder_commands.delete(id).await
    }

    /// # Errors
    ///
    /// Fails for an unknown id or a remote failure.
    pub async fn mark_taken(&self, id: &ReminderId) -> Result<Reminder, Error> {
        self.reminder_commands.mark_taken(id).await
    }

    /// # Errors
    ///
    /// Fails for an unknown id, or when neither store can answer.
    pub async fn reminder(&self, id: &ReminderId) -> Result<Reminder, Error> {
        self.reminder_queries.get(id).await
    }

    /// # Errors
    ///
    /// Fails when neither the remote store nor the cache can answer.
    pub async fn reminders(&self) -> Result<Vec<Reminder>, Error> {
        self.reminder_queries.list_all().await
    }

    /// # Errors
    ///
    /// Fails when neither the remote store nor the cache can answer.
    pub async fn reminders_for_day(&self, day: DayKey) -> Result<Vec<Reminder>, Error> {
        self.reminder_queries.list_for_day(day).await
    }

    /// Reminders dated `date` (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Fails for a malformed date, or when neither store can answer.
    pub async fn reminders_for_date(&self, date: &str) -> Result<Vec<Reminder>, Error> {
        self.reminder_queries.list_for_date(date).await
    }

    // --- profile ---

    /// Profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// `unauthorized` without a session; `not_found` before the first save.
    pub async fn profile(&self) -> Result<UserProfile, Error> {
        let owner = self.signed_in_user().await?;
        self.profile_queries.load(&owner).await
    }

    /// Create or update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// `unauthorized` without a session; `invalid_request` for an email
    /// change or a future date of birth.
    pub async fn save_profile(&self, update: ProfileUpdate) -> Result<SaveProfileResponse, Error> {
        let owner = self.signed_in_user().await?;
        self.profile_commands.save(&owner, update).await
    }

    // --- home screen ---

    /// Calendar strip anchored on today.
    pub fn day_picker(&self) -> DayPicker {
        DayPicker::new(self.clock.local().date_naive())
    }

    /// Theme for the current local time.
    pub fn theme(&self) -> DisplayTheme {
        DisplayTheme::for_time(self.clock.local())
    }
}

#[cfg(test)]
mod tests {
    //! Wiring checks; behaviour is covered by the service tests and
    //! `tests/`.

    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::MutableClock;

    #[tokio::test]
    async fn profile_requires_a_session() {
        let app = App::in_memory(MutableClock::shared("2024-03-04 09:00"));
        let error = app.profile().await.expect_err("signed out");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn registration_form_errors_are_invalid_requests() {
        let app = App::in_memory(MutableClock::shared("2024-03-04 09:00"));
        let error = app
            .register("Ana", "a@b.com", "Aa1!aaaa", "Aa1!aaab")
            .await
            .expect_err("mismatch");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn home_screen_helpers_follow_the_clock() {
        let app = App::in_memory(MutableClock::shared("2024-03-04 20:00"));
        assert_eq!(app.day_picker().selected_day(), DayKey::Monday);
        assert_eq!(app.theme(), DisplayTheme::Night);
    }

    #[test]
    fn in_memory_apps_have_no_alarm_feed() {
        let app = App::in_memory(MutableClock::shared("2024-03-04 09:00"));
        assert!(app.take_alarm_feed().is_none());
    }
}
