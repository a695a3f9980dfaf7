//! Reminder repository kept in insertion order.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{ReminderRepository, ReminderRepositoryError};
use crate::domain::{Reminder, ReminderId, ReminderPatch};

/// In-memory stand-in for the hosted reminder collection.
///
/// [`set_offline`](Self::set_offline) makes every call fail with a
/// connection error, which exercises the cache fallback.
#[derive(Debug, Default)]
pub struct InMemoryReminderRepository {
    reminders: Mutex<Vec<Reminder>>,
    offline: AtomicBool,
}

impl InMemoryReminderRepository {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), ReminderRepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ReminderRepositoryError::connection("reminder store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReminderRepository for InMemoryReminderRepository {
    async fn list(&self) -> Result<Vec<Reminder>, ReminderRepositoryError> {
        self.ensure_online()?;
        Ok(lock(&self.reminders).clone())
    }

    async fn find_by_id(
        &self,
        id: &ReminderId,
    ) -> Result<Option<Reminder>, ReminderRepositoryError> {
        self.ensure_online()?;
        Ok(lock(&self.reminders)
            .iter()
            .find(|reminder| reminder.id() == *id)
            .cloned())
    }

    async fn save(&self, reminder: &Reminder) -> Result<(), ReminderRepositoryError> {
        self.ensure_online()?;
        let mut reminders = lock(&self.reminders);
        match reminders.iter_mut().find(|existing| existing.id() == reminder.id()) {
            Some(slot) => *slot = reminder.clone(),
            None => reminders.push(reminder.clone()),
        }
        Ok(())
    }

    async fn update(
        &self,
        id: &ReminderId,
        patch: &ReminderPatch,
    ) -> Result<(), ReminderRepositoryError> {
        self.ensure_online()?;
        let mut reminders = lock(&self.reminders);
        let reminder = reminders
            .iter_mut()
            .find(|reminder| reminder.id() == *id)
            .ok_or_else(|| ReminderRepositoryError::query(format!("reminder {id} missing")))?;
        reminder.apply(patch);
        Ok(())
    }

    async fn delete(&self, id: &ReminderId) -> Result<(), ReminderRepositoryError> {
        self.ensure_online()?;
        lock(&self.reminders).retain(|reminder| reminder.id() != *id);
        Ok(())
    }
}
