//! In-process adapters.
//!
//! They back [`crate::App::in_memory`] for offline use and give integration
//! tests real port behaviour without a network. State lives behind
//! `std::sync::Mutex` and is never held across an `.await`.

mod alarms;
mod cache;
mod identity;
mod records;
mod reminders;
mod sessions;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use alarms::RecordingAlarmScheduler;
pub use cache::InMemoryReminderCache;
pub use identity::InMemoryIdentityProvider;
pub use records::{InMemoryProfileRepository, InMemoryUserRepository};
pub use reminders::InMemoryReminderRepository;
pub use sessions::InMemorySessionTokens;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
