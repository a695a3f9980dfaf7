//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed reminder, profile and account model,
//! the services implementing the driving ports, and the driven ports that
//! outbound adapters implement. Nothing here performs I/O directly.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Reminder, ReminderDetails, ReminderPatch: the reminder aggregate.
//! - UserProfile, ProfileUpdate: per-user profile data.
//! - DayPicker, WeekWindow: home screen calendar strip.
//! - AuthService, ReminderService, ProfileService: driving port
//!   implementations.

pub mod alarm;
pub mod auth;
pub mod auth_service;
pub mod calendar;
pub mod error;
pub mod password_strength;
pub mod ports;
pub mod profile;
pub mod profile_service;
pub mod reminder;
pub mod reminder_service;
pub mod theme;
pub mod user;

pub use self::alarm::{AlarmDefaults, AlarmRequest, DEFAULT_ALARM_MESSAGE, DEFAULT_SNOOZE_MINUTES};
pub use self::auth::{
    AuthFailureKind, AuthSession, AuthValidationError, IdToken, LoginCredentials,
    RegistrationOutcome, RegistrationRequest,
};
pub use self::auth_service::AuthService;
pub use self::calendar::{CalendarDay, CalendarError, DayPicker, MONTH_NAMES, WeekWindow, month_name};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password_strength::{PasswordStrength, StrengthLevel};
pub use self::profile::{
    AvatarRef, Gender, ProfileUpdate, ProfileValidationError, UserProfile, parse_date_of_birth,
};
pub use self::profile_service::ProfileService;
pub use self::reminder::{
    DayKey, Dosage, MAX_OCCURRENCES, MedicationForm, MedicationName, Reminder, ReminderDetails,
    ReminderDetailsBuilder, ReminderId, ReminderPatch, ReminderSchedule, ReminderStatus,
    ReminderTime, ReminderValidationError, RepeatInterval, SecondDose, occurrences, quantity,
};
pub use self::reminder_service::ReminderService;
pub use self::theme::DisplayTheme;
pub use self::user::{Email, UserId, UserRecord, UserValidationError, Username};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use idozer::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("no such reminder"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
