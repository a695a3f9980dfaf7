//! Week strip shown on the home screen.
//!
//! The strip is the seven-day Sunday-first window containing the selected
//! date. Slots before the first of the month carry the previous month's day
//! numbers and slots after its end carry the next month's.

use std::fmt;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::Serialize;

use super::reminder::DayKey;

/// English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors raised by calendar navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidMonth { month: u32 },
    OutOfRange,
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth { month } => write!(f, "month {month} is not in 1..=12"),
            Self::OutOfRange => write!(f, "date is outside the supported calendar range"),
        }
    }
}

impl std::error::Error for CalendarError {}

impl From<CalendarError> for super::Error {
    fn from(value: CalendarError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// English name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_NAMES.get(index).copied()
}

/// Seven consecutive dates starting on a Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    start: NaiveDate,
}

impl WeekWindow {
    /// Window containing `date`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use idozer::domain::WeekWindow;
    ///
    /// let first_of_march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// let window = WeekWindow::containing(first_of_march);
    /// assert_eq!(window.day_numbers(), [25, 26, 27, 28, 29, 1, 2]);
    /// ```
    pub fn containing(date: NaiveDate) -> Self {
        let back = TimeDelta::days(i64::from(date.weekday().num_days_from_sunday()));
        Self {
            start: date - back,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + TimeDelta::days(6)
    }

    /// Dates in the window, Sunday first.
    pub fn dates(&self) -> [NaiveDate; 7] {
        DayKey::ALL.map(|day| self.date_for(day))
    }

    /// Day-of-month numbers, Sunday first.
    pub fn day_numbers(&self) -> [u32; 7] {
        self.dates().map(|date| date.day())
    }

    /// Date in this window falling on `day`.
    pub fn date_for(&self, day: DayKey) -> NaiveDate {
        self.start + TimeDelta::days(i64::from(day.index()))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end()
    }
}

/// One slot of the calendar strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: DayKey,
    pub day_number: u32,
    pub is_today: bool,
    pub is_selected: bool,
}

/// Selection state behind the home screen calendar strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPicker {
    today: NaiveDate,
    selected: NaiveDate,
}

impl DayPicker {
    /// Picker anchored on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            selected: today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn selected_day(&self) -> DayKey {
        DayKey::of(self.selected)
    }

    pub fn window(&self) -> WeekWindow {
        WeekWindow::containing(self.selected)
    }

    /// Heading such as `March 2024` for the selected date.
    pub fn month_label(&self) -> String {
        let name = month_name(self.selected.month()).unwrap_or_default();
        format!("{name} {}", self.selected.year())
    }

    /// Re-anchor on `date`.
    pub fn select_day(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    /// Jump to `month` of the selected year: today when that is the
    /// current month, otherwise the first of the month.
    pub fn select_month(&mut self, month: u32) -> Result<(), CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        let year = self.selected.year();
        self.selected = if year == self.today.year() && month == self.today.month() {
            self.today
        } else {
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::OutOfRange)?
        };
        Ok(())
    }

    pub fn next_week(&mut self) -> Result<(), CalendarError> {
        self.shift_days(7)
    }

    pub fn previous_week(&mut self) -> Result<(), CalendarError> {
        self.shift_days(-7)
    }

    fn shift_days(&mut self, days: i64) -> Result<(), CalendarError> {
        self.selected = self
            .selected
            .checked_add_signed(TimeDelta::days(days))
            .ok_or(CalendarError::OutOfRange)?;
        Ok(())
    }

    /// Slots for the visible week.
    pub fn strip(&self) -> [CalendarDay; 7] {
        self.window().dates().map(|date| CalendarDay {
            date,
            day: DayKey::of(date),
            day_number: date.day(),
            is_today: date == self.today,
            is_selected: date == self.selected,
        })
    }
}
