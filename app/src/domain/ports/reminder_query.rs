//! Driving port for reminder reads.
//!
//! Reads hit the remote store first and fall back to the device cache when
//! it fails. Collection order is preserved by every filter.

use async_trait::async_trait;

use crate::domain::{DayKey, Error, Reminder, ReminderId};

#[async_trait]
pub trait ReminderQuery: Send + Sync {
    /// One reminder, for the edit screen.
    async fn get(&self, id: &ReminderId) -> Result<Reminder, Error>;

    async fn list_all(&self) -> Result<Vec<Reminder>, Error>;

    /// Weekly reminders for `day`.
    async fn list_for_day(&self, day: DayKey) -> Result<Vec<Reminder>, Error>;

    /// Reminders dated `date`, given as `YYYY-MM-DD`.
    async fn list_for_date(&self, date: &str) -> Result<Vec<Reminder>, Error>;
}
