//! Per-user profile data kept beside the account record.
//!
//! One profile exists per owner and is keyed by the owner's [`UserId`]; the
//! email is copied from the account and never edited through the profile.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::user::{Email, UserId, UserRecord, Username};

/// Display and input format for dates of birth.
pub const DATE_OF_BIRTH_FORMAT: &str = "%d/%m/%Y";

/// Validation errors raised while editing a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmailImmutable,
    DateOfBirthInFuture,
    InvalidDateOfBirth { value: String },
    UnknownGender { value: String },
    EmptyAvatar,
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailImmutable => write!(f, "profile email cannot be changed"),
            Self::DateOfBirthInFuture => write!(f, "date of birth cannot be in the future"),
            Self::InvalidDateOfBirth { value } => {
                write!(f, "date of birth {value:?} must be DD/MM/YYYY")
            }
            Self::UnknownGender { value } => write!(f, "unknown gender {value:?}"),
            Self::EmptyAvatar => write!(f, "avatar reference must not be empty"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

impl From<ProfileValidationError> for super::Error {
    fn from(value: ProfileValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Masculino",
            Self::Female => "Femenino",
            Self::Other => "Otro",
        }
    }
}

impl FromStr for Gender {
    type Err = ProfileValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masculino" | "male" => Ok(Self::Male),
            "femenino" | "female" => Ok(Self::Female),
            "otro" | "other" => Ok(Self::Other),
            _ => Err(ProfileValidationError::UnknownGender {
                value: s.to_owned(),
            }),
        }
    }
}

/// Reference to the avatar image (device URI or storage URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AvatarRef(String);

impl AvatarRef {
    pub fn new(value: impl Into<String>) -> Result<Self, ProfileValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ProfileValidationError::EmptyAvatar);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for AvatarRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AvatarRef> for String {
    fn from(value: AvatarRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for AvatarRef {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Parse a `DD/MM/YYYY` date of birth typed into the form.
///
/// # Examples
/// ```
/// use idozer::domain::parse_date_of_birth;
///
/// let dob = parse_date_of_birth("29/02/2000").unwrap();
/// assert_eq!(dob.to_string(), "2000-02-29");
/// ```
pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, ProfileValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_OF_BIRTH_FORMAT).map_err(|_| {
        ProfileValidationError::InvalidDateOfBirth {
            value: raw.to_owned(),
        }
    })
}

/// Stored profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub owner: UserId,
    pub username: Username,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<AvatarRef>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty profile seeded from the account record.
    pub fn for_user(user: &UserRecord, updated_at: DateTime<Utc>) -> Self {
        Self {
            owner: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            gender: None,
            date_of_birth: None,
            avatar: None,
            updated_at,
        }
    }

    /// Date of birth formatted for display.
    pub fn date_of_birth_label(&self) -> Option<String> {
        self.date_of_birth
            .map(|dob| dob.format(DATE_OF_BIRTH_FORMAT).to_string())
    }

    /// Apply `update`, rejecting email changes and future birth dates.
    pub fn apply(
        &mut self,
        update: &ProfileUpdate,
        today: NaiveDate,
        updated_at: DateTime<Utc>,
    ) -> Result<(), ProfileValidationError> {
        update.validate(today)?;
        if update.email.as_ref().is_some_and(|email| email != &self.email) {
            return Err(ProfileValidationError::EmailImmutable);
        }
        if let Some(username) = &update.username {
            self.username = username.clone();
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(avatar) = &update.avatar {
            self.avatar = avatar.clone();
        }
        self.updated_at = updated_at;
        Ok(())
    }
}

/// Fields submitted from the profile screen.
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub gender: Option<Option<Gender>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub avatar: Option<Option<AvatarRef>>,
}

impl ProfileUpdate {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ProfileValidationError> {
        match self.date_of_birth {
            Some(Some(dob)) if dob > today => Err(ProfileValidationError::DateOfBirthInFuture),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[fixture]
    fn profile() -> UserProfile {
        let user = UserRecord {
            id: UserId::new("uid1").expect("id"),
            username: Username::new("Ana").expect("username"),
            email: Email::new("ana@example.com").expect("email"),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        UserProfile::for_user(&user, DateTime::<Utc>::UNIX_EPOCH)
    }

    #[rstest]
    #[case("Masculino", Gender::Male)]
    #[case("femenino", Gender::Female)]
    #[case(" Otro ", Gender::Other)]
    fn genders_parse_spanish_labels(#[case] raw: &str, #[case] expected: Gender) {
        let gender: Gender = raw.parse().expect("gender");
        assert_eq!(gender, expected);
        assert_eq!(gender.label().to_lowercase(), raw.trim().to_lowercase());
    }

    #[rstest]
    #[case("31/02/2000")]
    #[case("2000-01-01")]
    #[case("")]
    fn malformed_birth_dates_are_rejected(#[case] raw: &str) {
        assert!(matches!(
            parse_date_of_birth(raw),
            Err(ProfileValidationError::InvalidDateOfBirth { .. })
        ));
    }

    #[rstest]
    fn apply_updates_fields(mut profile: UserProfile) {
        let update = ProfileUpdate {
            username: Some(Username::new("Ana María").expect("username")),
            gender: Some(Some(Gender::Female)),
            date_of_birth: Some(Some(date(1990, 5, 17))),
            ..ProfileUpdate::default()
        };
        profile
            .apply(&update, date(2024, 1, 1), DateTime::<Utc>::UNIX_EPOCH)
            .expect("valid update");
        assert_eq!(profile.username.as_ref(), "Ana María");
        assert_eq!(profile.gender, Some(Gender::Female));
        assert_eq!(profile.date_of_birth_label().as_deref(), Some("17/05/1990"));
    }

    #[rstest]
    fn apply_rejects_email_change(mut profile: UserProfile) {
        let update = ProfileUpdate {
            email: Some(Email::new("other@example.com").expect("email")),
            ..ProfileUpdate::default()
        };
        let err = profile
            .apply(&update, date(2024, 1, 1), DateTime::<Utc>::UNIX_EPOCH)
            .expect_err("email change");
        assert_eq!(err, ProfileValidationError::EmailImmutable);
    }

    #[rstest]
    fn apply_accepts_unchanged_email(mut profile: UserProfile) {
        let update = ProfileUpdate {
            email: Some(Email::new("ANA@example.com").expect("email")),
            ..ProfileUpdate::default()
        };
        assert!(
            profile
                .apply(&update, date(2024, 1, 1), DateTime::<Utc>::UNIX_EPOCH)
                .is_ok()
        );
    }

    #[rstest]
    fn apply_rejects_future_birth_date(mut profile: UserProfile) {
        let update = ProfileUpdate {
            date_of_birth: Some(Some(date(2030, 1, 1))),
            ..ProfileUpdate::default()
        };
        let err = profile
            .apply(&update, date(2024, 1, 1), DateTime::<Utc>::UNIX_EPOCH)
            .expect_err("future dob");
        assert_eq!(err, ProfileValidationError::DateOfBirthInFuture);
    }

    #[rstest]
    fn optional_fields_are_omitted_when_empty(profile: UserProfile) {
        let value = serde_json::to_value(&profile).expect("serialise");
        assert!(value.get("gender").is_none());
        assert_eq!(value["owner"], "uid1");
        let decoded: UserProfile = serde_json::from_value(value).expect("deserialise");
        assert_eq!(decoded, profile);
    }
}
