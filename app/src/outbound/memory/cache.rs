//! Reminder cache holding the serialised list in memory.
//!
//! The list is kept as JSON text, like the device key-value store, so
//! encoding problems surface here the same way they would on a device.

use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::Reminder;
use crate::domain::ports::{ReminderCache, ReminderCacheError};

#[derive(Debug, Default)]
pub struct InMemoryReminderCache {
    document: Mutex<Option<String>>,
}

impl InMemoryReminderCache {
    /// Overwrite the stored document verbatim.
    pub fn put_raw(&self, document: impl Into<String>) {
        *lock(&self.document) = Some(document.into());
    }

    pub fn raw(&self) -> Option<String> {
        lock(&self.document).clone()
    }
}

#[async_trait]
impl ReminderCache for InMemoryReminderCache {
    async fn load(&self) -> Result<Option<Vec<Reminder>>, ReminderCacheError> {
        let Some(document) = self.raw() else {
            return Ok(None);
        };
        serde_json::from_str(&document)
            .map(Some)
            .map_err(|error| ReminderCacheError::serialization(error.to_string()))
    }

    async fn store(&self, reminders: &[Reminder]) -> Result<(), ReminderCacheError> {
        let document = serde_json::to_string(reminders)
            .map_err(|error| ReminderCacheError::serialization(error.to_string()))?;
        self.put_raw(document);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ReminderCacheError> {
        *lock(&self.document) = None;
        Ok(())
    }
}
