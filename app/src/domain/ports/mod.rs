//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod alarm_scheduler;
mod auth_gateway;
mod identity_provider;
mod profile_command;
mod profile_query;
mod profile_repository;
mod reminder_cache;
mod reminder_command;
mod reminder_query;
mod reminder_repository;
mod session_tokens;
mod user_repository;

#[cfg(test)]
pub use alarm_scheduler::MockAlarmScheduler;
pub use alarm_scheduler::{AlarmScheduler, AlarmSchedulerError, FixtureAlarmScheduler};
pub use auth_gateway::AuthGateway;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    FixtureIdentityProvider, IdentityProvider, IdentityProviderError, ProviderAccount,
};
pub use profile_command::{ProfileCommand, SaveProfileResponse};
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{FixtureProfileRepository, ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use reminder_cache::MockReminderCache;
pub use reminder_cache::{FixtureReminderCache, ReminderCache, ReminderCacheError};
pub use reminder_command::{ReminderCommand, ReminderCreated};
pub use reminder_query::ReminderQuery;
#[cfg(test)]
pub use reminder_repository::MockReminderRepository;
pub use reminder_repository::{
    FixtureReminderRepository, ReminderRepository, ReminderRepositoryError,
};
#[cfg(test)]
pub use session_tokens::MockSessionTokenStore;
pub use session_tokens::{FixtureSessionTokenStore, SessionTokenStore};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
