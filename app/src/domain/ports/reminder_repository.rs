//! Port for the authoritative reminder store.
//!
//! The remote hierarchical database keyed by reminder id is the single source
//! of truth. Adapters return the collection in creation order.

use async_trait::async_trait;

use crate::domain::{Reminder, ReminderId, ReminderPatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reminder repository adapters.
    pub enum ReminderRepositoryError {
        /// The store could not be reached.
        Connection { message: String } => "reminder store connection failed: {message}",
        /// The store refused the session token.
        Unauthorized { message: String } => "reminder store denied access: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } => "reminder store query failed: {message}",
        /// A stored record could not be decoded.
        Decode { message: String } => "reminder record could not be decoded: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Every reminder, oldest first.
    async fn list(&self) -> Result<Vec<Reminder>, ReminderRepositoryError>;

    async fn find_by_id(&self, id: &ReminderId)
    -> Result<Option<Reminder>, ReminderRepositoryError>;

    /// Write the full record under its id, replacing any existing one.
    async fn save(&self, reminder: &Reminder) -> Result<(), ReminderRepositoryError>;

    /// Replace only the fields named by `patch`.
    ///
    /// Callers check existence first; adapters may create the record when it
    /// is missing.
    async fn update(
        &self,
        id: &ReminderId,
        patch: &ReminderPatch,
    ) -> Result<(), ReminderRepositoryError>;

    /// Remove the record. Deleting a missing id succeeds.
    async fn delete(&self, id: &ReminderId) -> Result<(), ReminderRepositoryError>;
}

/// Fixture repository that is always empty and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReminderRepository;

#[async_trait]
impl ReminderRepository for FixtureReminderRepository {
    async fn list(&self) -> Result<Vec<Reminder>, ReminderRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: &ReminderId,
    ) -> Result<Option<Reminder>, ReminderRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _reminder: &Reminder) -> Result<(), ReminderRepositoryError> {
        Ok(())
    }

    async fn update(
        &self,
        _id: &ReminderId,
        _patch: &ReminderPatch,
    ) -> Result<(), ReminderRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: &ReminderId) -> Result<(), ReminderRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_repository_is_empty() {
        let repo = FixtureReminderRepository;
        assert!(repo.list().await.expect("list").is_empty());
        assert!(
            repo.find_by_id(&ReminderId::random())
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[test]
    fn decode_errors_format_message() {
        let err = ReminderRepositoryError::decode("missing field `name`");
        assert_eq!(
            err.to_string(),
            "reminder record could not be decoded: missing field `name`"
        );
    }
}
