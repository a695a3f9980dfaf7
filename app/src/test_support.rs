//! Test helpers shared by unit and integration tests.
//!
//! Enabled for `cfg(test)` and the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{DayKey, Dosage, MedicationName, ReminderDetails, ReminderSchedule};

/// Clock pinned to a local wall-clock time, independent of the host zone.
///
/// `local().naive_local()` always returns the configured wall-clock time.
pub struct MutableClock(Mutex<NaiveDateTime>);

impl MutableClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self(Mutex::new(local))
    }

    /// Parse `YYYY-MM-DD HH:MM` as local wall-clock time.
    pub fn at(local: &str) -> Self {
        Self::new(local_datetime(local))
    }

    /// Shared handle suitable for service constructors.
    pub fn shared(local: &str) -> Arc<Self> {
        Arc::new(Self::at(local))
    }

    pub fn set(&self, local: NaiveDateTime) {
        *self.lock_clock() = local;
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    pub fn today(&self) -> NaiveDate {
        self.lock_clock().date()
    }

    fn lock_clock(&self) -> MutexGuard<'_, NaiveDateTime> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        let naive = *self.lock_clock();
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(local) | LocalResult::Ambiguous(local, _) => local,
            LocalResult::None => panic!("{naive} does not exist in the host time zone"),
        }
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local().with_timezone(&Utc)
    }
}

/// Parse `YYYY-MM-DD HH:MM`, panicking on malformed test input.
pub fn local_datetime(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .unwrap_or_else(|error| panic!("invalid test datetime {raw:?}: {error}"))
}

/// Weekly reminder draft with the given medication, dosage, time and day.
pub fn weekly_details(name: &str, dosage: &str, time: &str, day: DayKey) -> ReminderDetails {
    ReminderDetails::builder(
        MedicationName::new(name).unwrap_or_else(|error| panic!("name: {error}")),
        Dosage::new(dosage).unwrap_or_else(|error| panic!("dosage: {error}")),
        time.parse()
            .unwrap_or_else(|error| panic!("time {time:?}: {error}")),
        ReminderSchedule::weekly(day),
    )
    .build()
}

/// Reminder draft dated `date` (`YYYY-MM-DD`).
pub fn dated_details(name: &str, dosage: &str, time: &str, date: &str) -> ReminderDetails {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap_or_else(|error| panic!("date {date:?}: {error}"));
    ReminderDetails::builder(
        MedicationName::new(name).unwrap_or_else(|error| panic!("name: {error}")),
        Dosage::new(dosage).unwrap_or_else(|error| panic!("dosage: {error}")),
        time.parse()
            .unwrap_or_else(|error| panic!("time {time:?}: {error}")),
        ReminderSchedule::on_date(date),
    )
    .build()
}

/// Fresh temporary directory for file-backed adapters.
pub fn temp_cache_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|error| panic!("temp dir: {error}"))
}
