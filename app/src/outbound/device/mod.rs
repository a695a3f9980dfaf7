//! On-device adapters: the persisted reminder list and the alarm hand-off.

mod alarms;
mod atomic_io;
mod file_cache;

pub use alarms::{ALARM_QUEUE_CAPACITY, ChannelAlarmScheduler};
pub use file_cache::{CACHE_FILE_NAME, FileReminderCache};
