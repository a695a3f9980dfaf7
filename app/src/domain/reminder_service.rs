//! Reminder service implementing the [`ReminderCommand`] and
//! [`ReminderQuery`] driving ports.
//!
//! The remote repository is authoritative. The device cache is refreshed
//! after each remote success and read only when the remote store fails;
//! cache and alarm failures are logged and never surface as errors.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AlarmScheduler, ReminderCache, ReminderCommand, ReminderCreated, ReminderQuery,
    ReminderRepository, ReminderRepositoryError,
};
use crate::domain::{
    AlarmDefaults, DayKey, Error, Reminder, ReminderDetails, ReminderId, ReminderPatch,
    ReminderValidationError, occurrences,
};

/// Wire format for dates passed to [`ReminderQuery::list_for_date`].
pub const DATE_FILTER_FORMAT: &str = "%Y-%m-%d";

/// Reminder service over the remote store, device cache and alarm scheduler.
pub struct ReminderService<R, C, A> {
    reminders: Arc<R>,
    cache: Arc<C>,
    alarms: Arc<A>,
    clock: Arc<dyn Clock>,
    alarm_defaults: AlarmDefaults,
}

impl<R, C, A> ReminderService<R, C, A> {
    pub fn new(reminders: Arc<R>, cache: Arc<C>, alarms: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reminders,
            cache,
            alarms,
            clock,
            alarm_defaults: AlarmDefaults::default(),
        }
    }

    /// Override the alarm message and snooze length.
    #[must_use]
    pub fn with_alarm_defaults(mut self, alarm_defaults: AlarmDefaults) -> Self {
        self.alarm_defaults = alarm_defaults;
        self
    }
}

impl<R, C, A> ReminderService<R, C, A>
where
    R: ReminderRepository,
    C: ReminderCache,
    A: AlarmScheduler,
{
    fn map_repository_error(error: ReminderRepositoryError) -> Error {
        match error {
            ReminderRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("reminder store unavailable: {message}"))
            }
            ReminderRepositoryError::Unauthorized { message } => {
                Error::unauthorized(format!("reminder store denied access: {message}"))
            }
            ReminderRepositoryError::Query { message } => {
                Error::internal(format!("reminder store error: {message}"))
            }
            ReminderRepositoryError::Decode { message } => {
                Error::internal(format!("stored reminder is malformed: {message}"))
            }
        }
    }

    fn not_found(id: &ReminderId) -> Error {
        Error::not_found(format!("reminder {id} not found"))
    }

    async fn existing(&self, id: &ReminderId) -> Result<Reminder, Error> {
        self.reminders
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Load the cached list, apply `edit`, and store it back.
    ///
    /// With nothing cached the edit is applied to an empty list only when
    /// `seed_when_empty` is set. An unreadable cache is cleared.
    async fn edit_cache<F>(&self, seed_when_empty: bool, edit: F)
    where
        F: FnOnce(&mut Vec<Reminder>) + Send,
    {
        let cached = match self.cache.load().await {
            Ok(cached) => cached,
            Err(error) => {
                warn!(%error, "reminder cache unreadable; clearing it");
                if let Err(error) = self.cache.clear().await {
                    warn!(%error, "reminder cache could not be cleared");
                }
                return;
            }
        };
        let Some(mut list) = cached.or_else(|| seed_when_empty.then(Vec::new)) else {
            return;
        };
        edit(&mut list);
        if let Err(error) = self.cache.store(&list).await {
            warn!(%error, "reminder cache could not be refreshed");
        }
    }

    /// The whole collection, remote first with the cache as fallback.
    async fn fetch_all(&self) -> Result<Vec<Reminder>, Error> {
        match self.reminders.list().await {
            Ok(reminders) => {
                if let Err(error) = self.cache.store(&reminders).await {
                    warn!(%error, "reminder cache could not be refreshed");
                }
                debug!(count = reminders.len(), "reminders fetched from remote store");
                Ok(reminders)
            }
            Err(remote) => match self.cache.load().await {
                Ok(Some(cached)) => {
                    warn!(error = %remote, count = cached.len(), "serving cached reminders");
                    Ok(cached)
                }
                Ok(None) => Err(Self::map_repository_error(remote)),
                Err(error) => {
                    warn!(%error, "reminder cache unreadable");
                    Err(Self::map_repository_error(remote))
                }
            },
        }
    }

    fn parse_date(raw: &str) -> Result<NaiveDate, ReminderValidationError> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FILTER_FORMAT).map_err(|_| {
            ReminderValidationError::InvalidDate {
                value: raw.to_owned(),
            }
        })
    }
}

#[async_trait]
impl<R, C, A> ReminderCommand for ReminderService<R, C, A>
where
    R: ReminderRepository,
    C: ReminderCache,
    A: AlarmScheduler,
{
    async fn create(&self, details: ReminderDetails) -> Result<ReminderCreated, Error> {
        let reminder = Reminder::new(ReminderId::random(), self.clock.utc(), details);
        self.reminders
            .save(&reminder)
            .await
            .map_err(Self::map_repository_error)?;

        let cached = reminder.clone();
        self.edit_cache(true, move |list| {
            list.retain(|existing| existing.id() != cached.id());
            list.push(cached);
        })
        .await;

        let now = self.clock.local().naive_local();
        let details = reminder.details();
        let first = details.schedule.first_occurrence(details.time, now);
        let expanded = occurrences(first, details.repeat_interval);
        let alarm = self.alarm_defaults.request(first, now);
        let alarm_scheduled = match self.alarms.schedule(&alarm).await {
            Ok(()) => true,
            Err(error) => {
                warn!(reminder_id = %reminder.id(), %error, "alarm could not be scheduled");
                false
            }
        };

        info!(
            reminder_id = %reminder.id(),
            first_occurrence = %alarm.iso_timestamp(),
            alarm_scheduled,
            "reminder created"
        );
        Ok(ReminderCreated {
            reminder,
            occurrences: expanded,
            alarm,
            alarm_scheduled,
        })
    }

    async fn update(&self, id: &ReminderId, patch: ReminderPatch) -> Result<Reminder, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request("reminder update names no fields"));
        }
        let mut reminder = self.existing(id).await?;
        self.reminders
            .update(id, &patch)
            .await
            .map_err(Self::map_repository_error)?;
        reminder.apply(&patch);

        let cached = reminder.clone();
        self.edit_cache(false, move |list| {
            if let Some(slot) = list.iter_mut().find(|existing| existing.id() == cached.id()) {
                *slot = cached;
            } else {
                list.push(cached);
            }
        })
        .await;

        info!(reminder_id = %id, "reminder updated");
        Ok(reminder)
    }

    async fn delete(&self, id: &ReminderId) -> Result<(), Error> {
        self.existing(id).await?;
        self.reminders
            .delete(id)
            .await
            .map_err(Self::map_repository_error)?;

        let id = *id;
        self.edit_cache(false, move |list| list.retain(|existing| existing.id() != id))
            .await;

        info!(reminder_id = %id, "reminder deleted");
        Ok(())
    }

    async fn mark_taken(&self, id: &ReminderId) -> Result<Reminder, Error> {
        self.update(id, ReminderPatch::mark_taken()).await
    }
}

#[async_trait]
impl<R, C, A> ReminderQuery for ReminderService<R, C, A>
where
    R: ReminderRepository,
    C: ReminderCache,
    A: AlarmScheduler,
{
    async fn get(&self, id: &ReminderId) -> Result<Reminder, Error> {
        match self.reminders.find_by_id(id).await {
            Ok(found) => found.ok_or_else(|| Self::not_found(id)),
            Err(remote) => {
                let cached = match self.cache.load().await {
                    Ok(cached) => cached,
                    Err(error) => {
                        warn!(%error, "reminder cache unreadable");
                        None
                    }
                };
                let Some(cached) = cached else {
                    return Err(Self::map_repository_error(remote));
                };
                warn!(error = %remote, reminder_id = %id, "serving cached reminder");
                cached
                    .into_iter()
                    .find(|reminder| reminder.id() == *id)
                    .ok_or_else(|| Self::not_found(id))
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<Reminder>, Error> {
        self.fetch_all().await
    }

    async fn list_for_day(&self, day: DayKey) -> Result<Vec<Reminder>, Error> {
        let mut reminders = self.fetch_all().await?;
        reminders.retain(|reminder| reminder.falls_on_day(day));
        Ok(reminders)
    }

    async fn list_for_date(&self, date: &str) -> Result<Vec<Reminder>, Error> {
        let date = Self::parse_date(date)?;
        let mut reminders = self.fetch_all().await?;
        reminders.retain(|reminder| reminder.falls_on_date(date));
        Ok(reminders)
    }
}

#[cfg(test)]
#[path = "reminder_service_tests.rs"]
mod tests;
