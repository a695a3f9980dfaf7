//! Driving port for profile edits.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, UserId, UserProfile};

/// Response from saving a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveProfileResponse {
    pub profile: UserProfile,
    /// True when no profile existed and one was created.
    pub created: bool,
}

#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Update the owner's profile, creating it on first save.
    ///
    /// # Errors
    /// - `invalid_request` when the update changes the email or carries a
    ///   future date of birth.
    /// - `not_found` when neither a profile nor an account record exists.
    async fn save(&self, owner: &UserId, update: ProfileUpdate)
    -> Result<SaveProfileResponse, Error>;
}
