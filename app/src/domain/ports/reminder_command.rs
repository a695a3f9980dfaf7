//! Driving port for reminder mutations.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{AlarmRequest, Error, Reminder, ReminderDetails, ReminderId, ReminderPatch};

/// Result of creating a reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderCreated {
    /// The stored record.
    pub reminder: Reminder,
    /// Local instants covered by the reminder, first one first.
    pub occurrences: Vec<NaiveDateTime>,
    /// Alarm requested for the first occurrence.
    pub alarm: AlarmRequest,
    /// False when the scheduler refused the alarm.
    pub alarm_scheduled: bool,
}

#[async_trait]
pub trait ReminderCommand: Send + Sync {
    /// Store a new reminder and arm its first alarm.
    async fn create(&self, details: ReminderDetails) -> Result<ReminderCreated, Error>;

    /// Replace the fields named by `patch`; the id is preserved.
    ///
    /// # Errors
    /// - `invalid_request` when the patch is empty.
    /// - `not_found` when no reminder has `id`.
    async fn update(&self, id: &ReminderId, patch: ReminderPatch) -> Result<Reminder, Error>;

    /// Remove a reminder. Unknown ids fail with `not_found`.
    async fn delete(&self, id: &ReminderId) -> Result<(), Error>;

    /// Record that the dose was taken.
    async fn mark_taken(&self, id: &ReminderId) -> Result<Reminder, Error>;
}
