//! Day/night display theme passed explicitly to screens.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// First hour rendered with the day theme.
pub const DAY_STARTS_AT: u32 = 6;
/// First hour rendered with the night theme.
pub const NIGHT_STARTS_AT: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayTheme {
    Day,
    Night,
}

impl DisplayTheme {
    /// Theme for a local hour of day.
    pub fn for_hour(hour: u32) -> Self {
        if (DAY_STARTS_AT..NIGHT_STARTS_AT).contains(&hour) {
            Self::Day
        } else {
            Self::Night
        }
    }

    /// Theme for a local time.
    pub fn for_time(time: impl Timelike) -> Self {
        Self::for_hour(time.hour())
    }

    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }

    pub fn is_day(self) -> bool {
        self == Self::Day
    }
}
