//! Reminder repository over the `reminders` collection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::database::{DatabaseError, RealtimeDatabaseClient};
use crate::domain::ports::{ReminderRepository, ReminderRepositoryError};
use crate::domain::{Reminder, ReminderId, ReminderPatch};

const COLLECTION: &str = "reminders";

impl From<DatabaseError> for ReminderRepositoryError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Decode { message } => Self::decode(message),
            DatabaseError::Unauthorized { message } => Self::unauthorized(message),
            other if other.is_connectivity() => Self::connection(other.to_string()),
            other => Self::query(other.to_string()),
        }
    }
}

/// Reminders stored as `reminders/{id}`, one node per record.
pub struct FirebaseReminderRepository {
    database: Arc<RealtimeDatabaseClient>,
}

impl FirebaseReminderRepository {
    pub fn new(database: Arc<RealtimeDatabaseClient>) -> Self {
        Self { database }
    }
}

fn record_path(id: &ReminderId) -> String {
    format!("{COLLECTION}/{id}")
}

/// Decode a collection snapshot in creation order, skipping malformed nodes.
fn ordered_reminders(nodes: HashMap<String, Value>) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = nodes
        .into_iter()
        .filter_map(|(key, node)| match serde_json::from_value(node) {
            Ok(reminder) => Some(reminder),
            Err(error) => {
                warn!(key = %key, %error, "skipping malformed reminder node");
                None
            }
        })
        .collect();
    reminders.sort_by_key(|reminder| (reminder.created_at(), reminder.id()));
    reminders
}

#[async_trait]
impl ReminderRepository for FirebaseReminderRepository {
    async fn list(&self) -> Result<Vec<Reminder>, ReminderRepositoryError> {
        let nodes: Option<HashMap<String, Value>> = self.database.get(COLLECTION).await?;
        Ok(nodes.map(ordered_reminders).unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        id: &ReminderId,
    ) -> Result<Option<Reminder>, ReminderRepositoryError> {
        Ok(self.database.get(&record_path(id)).await?)
    }

    async fn save(&self, reminder: &Reminder) -> Result<(), ReminderRepositoryError> {
        Ok(self
            .database
            .put(&record_path(&reminder.id()), reminder)
            .await?)
    }

    async fn update(
        &self,
        id: &ReminderId,
        patch: &ReminderPatch,
    ) -> Result<(), ReminderRepositoryError> {
        Ok(self.database.patch(&record_path(id), patch).await?)
    }

    async fn delete(&self, id: &ReminderId) -> Result<(), ReminderRepositoryError> {
        Ok(self.database.delete(&record_path(id)).await?)
    }
}
