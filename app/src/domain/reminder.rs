//! Medication reminder aggregate.
//!
//! A [`Reminder`] is created once with a client-generated [`ReminderId`] and
//! then edited in place through a [`ReminderPatch`]. The id never changes.
//!
//! Serialisation contract: records are stored as flat camelCase JSON objects,
//! e.g.
//! `{"id":"…","createdAt":"…","name":"Ibuprofeno","dosage":"200mg",
//! "time":"08:00","schedule":{"kind":"weekly","day":"lun"},"form":"tablet",
//! "quantity":1,"status":"pending"}`.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod schedule;

pub use schedule::{
    DayKey, MAX_OCCURRENCES, RepeatInterval, ReminderSchedule, ReminderTime, occurrences,
};

/// Validation errors for reminder fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    InvalidId,
    EmptyName,
    EmptyDosage,
    InvalidTime,
    InvalidDate { value: String },
    UnknownDay { value: String },
    UnknownForm { value: String },
    ZeroQuantity,
    UnsupportedInterval { minutes: u32 },
}

impl fmt::Display for ReminderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "reminder id must be a UUID"),
            Self::EmptyName => write!(f, "medication name must not be empty"),
            Self::EmptyDosage => write!(f, "dosage must not be empty"),
            Self::InvalidTime => write!(f, "time must be HH:MM in 24 hour format"),
            Self::InvalidDate { value } => write!(f, "date {value:?} must be YYYY-MM-DD"),
            Self::UnknownDay { value } => write!(f, "unknown day of week {value:?}"),
            Self::UnknownForm { value } => write!(f, "unknown medication form {value:?}"),
            Self::ZeroQuantity => write!(f, "quantity must be at least 1"),
            Self::UnsupportedInterval { minutes } => {
                write!(f, "repeat interval of {minutes} minutes is not supported")
            }
        }
    }
}

impl std::error::Error for ReminderValidationError {}

impl From<ReminderValidationError> for super::Error {
    fn from(value: ReminderValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// Stable reminder identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(Uuid);

impl ReminderId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ReminderId {
    type Err = ReminderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ReminderValidationError::InvalidId)
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! non_blank_text {
    ($(#[$meta:meta])* $name:ident, $error:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Trim and validate the value.
            pub fn new(value: impl Into<String>) -> Result<Self, ReminderValidationError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ReminderValidationError::$error);
                }
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ReminderValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

non_blank_text!(
    /// Medication title, e.g. `Ibuprofeno`.
    MedicationName,
    EmptyName
);

non_blank_text!(
    /// Free-form dosage, e.g. `200mg`.
    Dosage,
    EmptyDosage
);

/// Physical form of the medication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MedicationForm {
    #[default]
    Tablet,
    Capsule,
}

impl MedicationForm {
    /// Label shown on the form picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tablet => "Comprimido",
            Self::Capsule => "Cápsula",
        }
    }
}

impl FromStr for MedicationForm {
    type Err = ReminderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tablet" | "comprimido" => Ok(Self::Tablet),
            "capsule" | "cápsula" | "capsula" => Ok(Self::Capsule),
            _ => Err(ReminderValidationError::UnknownForm {
                value: s.to_owned(),
            }),
        }
    }
}

/// Whether the dose has been taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderStatus {
    #[default]
    Pending,
    Taken,
}

/// Optional follow-up dose on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondDose {
    pub time: ReminderTime,
    pub quantity: NonZeroU32,
}

/// Validate a raw quantity.
pub fn quantity(value: u32) -> Result<NonZeroU32, ReminderValidationError> {
    NonZeroU32::new(value).ok_or(ReminderValidationError::ZeroQuantity)
}

/// Editable content of a reminder; also the creation draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDetails {
    pub name: MedicationName,
    pub dosage: Dosage,
    pub time: ReminderTime,
    pub schedule: ReminderSchedule,
    #[serde(default)]
    pub form: MedicationForm,
    pub quantity: NonZeroU32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_dose: Option<SecondDose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<RepeatInterval>,
    #[serde(default)]
    pub status: ReminderStatus,
}

impl ReminderDetails {
    /// Start building details from the required fields.
    ///
    /// # Examples
    /// ```
    /// use idozer::domain::{DayKey, Dosage, MedicationName, ReminderDetails, ReminderSchedule};
    ///
    /// let details = ReminderDetails::builder(
    ///     MedicationName::new("Ibuprofeno").unwrap(),
    ///     Dosage::new("200mg").unwrap(),
    ///     "08:00".parse().unwrap(),
    ///     ReminderSchedule::weekly(DayKey::Monday),
    /// )
    /// .build();
    /// assert_eq!(details.quantity.get(), 1);
    /// ```
    pub fn builder(
        name: MedicationName,
        dosage: Dosage,
        time: ReminderTime,
        schedule: ReminderSchedule,
    ) -> ReminderDetailsBuilder {
        ReminderDetailsBuilder {
            details: Self {
                name,
                dosage,
                time,
                schedule,
                form: MedicationForm::default(),
                quantity: NonZeroU32::MIN,
                second_dose: None,
                repeat_interval: None,
                status: ReminderStatus::default(),
            },
        }
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat_interval.is_some()
    }
}

/// Builder for [`ReminderDetails`].
#[derive(Debug, Clone)]
pub struct ReminderDetailsBuilder {
    details: ReminderDetails,
}

impl ReminderDetailsBuilder {
    pub fn form(mut self, form: MedicationForm) -> Self {
        self.details.form = form;
        self
    }

    pub fn quantity(mut self, quantity: NonZeroU32) -> Self {
        self.details.quantity = quantity;
        self
    }

    pub fn second_dose(mut self, second_dose: SecondDose) -> Self {
        self.details.second_dose = Some(second_dose);
        self
    }

    pub fn repeat_every(mut self, interval: RepeatInterval) -> Self {
        self.details.repeat_interval = Some(interval);
        self
    }

    pub fn status(mut self, status: ReminderStatus) -> Self {
        self.details.status = status;
        self
    }

    pub fn build(self) -> ReminderDetails {
        self.details
    }
}

/// Stored reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    id: ReminderId,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    details: ReminderDetails,
}

impl Reminder {
    pub fn new(id: ReminderId, created_at: DateTime<Utc>, details: ReminderDetails) -> Self {
        Self {
            id,
            created_at,
            details,
        }
    }

    pub fn id(&self) -> ReminderId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn details(&self) -> &ReminderDetails {
        &self.details
    }

    /// Apply `patch`, replacing only the fields it names.
    pub fn apply(&mut self, patch: &ReminderPatch) {
        let details = &mut self.details;
        if let Some(name) = &patch.name {
            details.name = name.clone();
        }
        if let Some(dosage) = &patch.dosage {
            details.dosage = dosage.clone();
        }
        if let Some(time) = patch.time {
            details.time = time;
        }
        if let Some(schedule) = patch.schedule {
            details.schedule = schedule;
        }
        if let Some(form) = patch.form {
            details.form = form;
        }
        if let Some(quantity) = patch.quantity {
            details.quantity = quantity;
        }
        if let Some(second_dose) = patch.second_dose {
            details.second_dose = second_dose;
        }
        if let Some(repeat_interval) = patch.repeat_interval {
            details.repeat_interval = repeat_interval;
        }
        if let Some(status) = patch.status {
            details.status = status;
        }
    }

    /// True when this reminder is listed under `day` on the home screen.
    pub fn falls_on_day(&self, day: DayKey) -> bool {
        self.details.schedule.day() == Some(day)
    }

    /// True when this reminder is dated exactly `date`.
    pub fn falls_on_date(&self, date: chrono::NaiveDate) -> bool {
        self.details.schedule.date() == Some(date)
    }
}

/// Partial update for a reminder.
///
/// `None` leaves a field alone. For the clearable fields the inner
/// `Option` distinguishes "clear" (`Some(None)`) from "set".
/// Serialises to the JSON body of a partial update; cleared fields become
/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<MedicationName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<Dosage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<ReminderTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ReminderSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<MedicationForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<NonZeroU32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_dose: Option<Option<SecondDose>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<Option<RepeatInterval>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReminderStatus>,
}

impl ReminderPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Patch that marks the dose as taken.
    pub fn mark_taken() -> Self {
        Self {
            status: Some(ReminderStatus::Taken),
            ..Self::default()
        }
    }
}
