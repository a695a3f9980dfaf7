//! Local alarm requests handed to the device scheduler.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Message used when none is configured.
pub const DEFAULT_ALARM_MESSAGE: &str = "Recordatorio de medicamento";
/// Snooze length used when none is configured.
pub const DEFAULT_SNOOZE_MINUTES: u32 = 1;

/// A request to ring the device alarm at local time `fire_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmRequest {
    /// False when `fire_at` already passed; the scheduler keeps it disarmed.
    pub active: bool,
    #[serde(rename = "date", serialize_with = "serialize_iso")]
    pub fire_at: NaiveDateTime,
    pub message: String,
    #[serde(rename = "snooze")]
    pub snooze_minutes: u32,
}

impl AlarmRequest {
    /// Local ISO-8601 timestamp without offset, e.g. `2024-03-04T08:00:00`.
    pub fn iso_timestamp(&self) -> String {
        self.fire_at.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

fn serialize_iso<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S"))
}

/// Message and snooze applied to every scheduled alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmDefaults {
    pub message: String,
    pub snooze_minutes: u32,
}

impl Default for AlarmDefaults {
    fn default() -> Self {
        Self {
            message: DEFAULT_ALARM_MESSAGE.to_owned(),
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
        }
    }
}

impl AlarmDefaults {
    /// Build the request for `fire_at`, armed only when it is not before
    /// `now`.
    pub fn request(&self, fire_at: NaiveDateTime, now: NaiveDateTime) -> AlarmRequest {
        AlarmRequest {
            active: fire_at >= now,
            fire_at,
            message: self.message.clone(),
            snooze_minutes: self.snooze_minutes,
        }
    }
}
