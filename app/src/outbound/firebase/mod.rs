//! Firebase REST adapters.
//!
//! [`FirebaseIdentityProvider`] talks to the identity toolkit; the
//! repositories share one [`RealtimeDatabaseClient`] whose auth token is
//! set on sign-in and cleared on sign-out.

mod database;
mod dto;
mod http;
mod identity;
mod profiles;
mod reminders;
mod users;

pub use database::{DatabaseError, RealtimeDatabaseClient};
pub use identity::{DEFAULT_IDENTITY_ENDPOINT, FirebaseIdentityProvider};
pub use profiles::FirebaseProfileRepository;
pub use reminders::FirebaseReminderRepository;
pub use users::FirebaseUserRepository;
