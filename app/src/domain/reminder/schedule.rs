//! When a reminder fires: time of day, weekly or dated schedule, repeat
//! interval and the occurrence expansion used for alarms.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

use super::ReminderValidationError;

/// Upper bound on occurrences generated for a repeating reminder.
pub const MAX_OCCURRENCES: usize = 10;

const TIME_FORMAT: &str = "%H:%M";

/// Time of day in 24h `HH:MM`.
///
/// # Examples
/// ```
/// use idozer::domain::ReminderTime;
///
/// let time: ReminderTime = "08:30".parse().unwrap();
/// assert_eq!(time.to_string(), "08:30");
/// assert!("25:00".parse::<ReminderTime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ReminderValidationError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(ReminderValidationError::InvalidTime)
    }

    pub fn as_naive(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ReminderTime {
    type Err = ReminderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(Self)
            .map_err(|_| ReminderValidationError::InvalidTime)
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = ReminderValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Day of the week, Sunday first, keyed by its Spanish short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayKey {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayKey {
    /// All days in display order.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Short code used in storage and on the calendar strip.
    pub fn short_code(self) -> &'static str {
        match self {
            Self::Sunday => "dom",
            Self::Monday => "lun",
            Self::Tuesday => "mar",
            Self::Wednesday => "mié",
            Self::Thursday => "jue",
            Self::Friday => "vie",
            Self::Saturday => "sáb",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Self::Sunday => "Domingo",
            Self::Monday => "Lunes",
            Self::Tuesday => "Martes",
            Self::Wednesday => "Miércoles",
            Self::Thursday => "Jueves",
            Self::Friday => "Viernes",
            Self::Saturday => "Sábado",
        }
    }

    /// Position in the Sunday-first week, `0..7`.
    pub fn index(self) -> u32 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayKey {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }
}

impl FromStr for DayKey {
    type Err = ReminderValidationError;

    /// Accepts the short code with or without accents, or the long name,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        let unaccented = match needle.as_str() {
            "mie" => "mié",
            "sab" => "sáb",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|day| day.short_code() == unaccented || day.long_name().to_lowercase() == needle)
            .ok_or_else(|| ReminderValidationError::UnknownDay {
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_code())
    }
}

impl From<DayKey> for String {
    fn from(value: DayKey) -> Self {
        value.short_code().to_owned()
    }
}

impl TryFrom<String> for DayKey {
    type Error = ReminderValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether a reminder recurs on a weekday or fires on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReminderSchedule {
    Weekly { day: DayKey },
    OnDate { date: NaiveDate },
}

impl ReminderSchedule {
    pub fn weekly(day: DayKey) -> Self {
        Self::Weekly { day }
    }

    pub fn on_date(date: NaiveDate) -> Self {
        Self::OnDate { date }
    }

    pub fn day(&self) -> Option<DayKey> {
        match self {
            Self::Weekly { day } => Some(*day),
            Self::OnDate { .. } => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Weekly { .. } => None,
            Self::OnDate { date } => Some(*date),
        }
    }

    /// First instant at or after `now` matching this schedule.
    ///
    /// Dated schedules return their fixed instant even when it is in the
    /// past; callers decide whether a past alarm is still armed.
    pub fn first_occurrence(&self, time: ReminderTime, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::OnDate { date } => date.and_time(time.as_naive()),
            Self::Weekly { day } => {
                let today = now.date().weekday().num_days_from_sunday();
                let offset = (day.index() + 7 - today) % 7;
                let candidate = (now.date() + TimeDelta::days(i64::from(offset)))
                    .and_time(time.as_naive());
                if candidate < now {
                    candidate + TimeDelta::days(7)
                } else {
                    candidate
                }
            }
        }
    }
}

/// Fixed gap between repeated doses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RepeatInterval {
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    TwentyFourHours,
}

impl RepeatInterval {
    pub const ALL: [Self; 9] = [
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::FourHours,
        Self::SixHours,
        Self::EightHours,
        Self::TwelveHours,
        Self::TwentyFourHours,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::FourHours => 240,
            Self::SixHours => 360,
            Self::EightHours => 480,
            Self::TwelveHours => 720,
            Self::TwentyFourHours => 1440,
        }
    }

    pub fn as_delta(self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes()))
    }
}

impl TryFrom<u32> for RepeatInterval {
    type Error = ReminderValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.minutes() == value)
            .ok_or(ReminderValidationError::UnsupportedInterval { minutes: value })
    }
}

impl From<RepeatInterval> for u32 {
    fn from(value: RepeatInterval) -> Self {
        value.minutes()
    }
}

/// Expand a reminder into the instants its alarms cover.
///
/// Non-repeating reminders yield just `first`; repeating ones yield
/// [`MAX_OCCURRENCES`] instants spaced by the interval.
pub fn occurrences(first: NaiveDateTime, repeat: Option<RepeatInterval>) -> Vec<NaiveDateTime> {
    let Some(interval) = repeat else {
        return vec![first];
    };
    std::iter::successors(Some(first), |previous| {
        previous.checked_add_signed(interval.as_delta())
    })
    .take(MAX_OCCURRENCES)
    .collect()
}
