//! Reminder cache persisted as one JSON document on the device.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::Reminder;
use crate::domain::ports::{ReminderCache, ReminderCacheError};

/// File name of the cached list inside the cache directory.
pub const CACHE_FILE_NAME: &str = "reminders.json";

/// [`ReminderCache`] backed by `reminders.json` in a capability-scoped
/// directory. Blocking filesystem work runs on the blocking pool.
pub struct FileReminderCache {
    dir: Arc<Dir>,
    file: Utf8PathBuf,
}

impl FileReminderCache {
    /// Open (creating if needed) the cache directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderCacheError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> Result<Self, ReminderCacheError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(path, ambient_authority()))
            .map(Self::in_dir)
            .map_err(|error| ReminderCacheError::io(format!("open {path}: {error}")))
    }

    /// Use an already opened directory.
    pub fn in_dir(dir: Dir) -> Self {
        Self {
            dir: Arc::new(dir),
            file: Utf8PathBuf::from(CACHE_FILE_NAME),
        }
    }

    async fn blocking<T, F>(&self, operation: F) -> Result<T, ReminderCacheError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Utf8Path) -> Result<T, ReminderCacheError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || operation(&dir, &file))
            .await
            .map_err(|error| ReminderCacheError::io(format!("cache task failed: {error}")))?
    }
}

fn read_list(dir: &Dir, file: &Utf8Path) -> Result<Option<Vec<Reminder>>, ReminderCacheError> {
    let raw = match dir.read(file) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(ReminderCacheError::io(format!("read {file}: {error}"))),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|error| ReminderCacheError::serialization(format!("{file}: {error}")))
}

#[async_trait]
impl ReminderCache for FileReminderCache {
    async fn load(&self) -> Result<Option<Vec<Reminder>>, ReminderCacheError> {
        let list = self.blocking(read_list).await?;
        debug!(
            cached = list.as_ref().map(Vec::len),
            "reminder cache loaded"
        );
        Ok(list)
    }

    async fn store(&self, reminders: &[Reminder]) -> Result<(), ReminderCacheError> {
        let contents = serde_json::to_vec(reminders)
            .map_err(|error| ReminderCacheError::serialization(error.to_string()))?;
        let count = reminders.len();
        self.blocking(move |dir, file| {
            write_atomic(dir, file, &contents)
                .map_err(|error| ReminderCacheError::io(format!("write {file}: {error}")))
        })
        .await?;
        debug!(count, "reminder cache stored");
        Ok(())
    }

    async fn clear(&self) -> Result<(), ReminderCacheError> {
        self.blocking(|dir, file| match dir.remove_file(file) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ReminderCacheError::io(format!("remove {file}: {error}"))),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{DayKey, ReminderId};
    use crate::test_support::{temp_cache_dir, weekly_details};
    use chrono::{DateTime, Utc};

    fn cache_in(temp: &tempfile::TempDir) -> FileReminderCache {
        let path = Utf8Path::from_path(temp.path()).expect("utf-8 temp path");
        FileReminderCache::open(&path.join("cache")).expect("open cache")
    }

    fn reminder(name: &str, day: DayKey) -> Reminder {
        Reminder::new(
            ReminderId::random(),
            DateTime::<Utc>::UNIX_EPOCH,
            weekly_details(name, "200mg", "08:00", day),
        )
    }

    #[tokio::test]
    async fn empty_directory_has_no_list() {
        let temp = temp_cache_dir();
        let cache = cache_in(&temp);
        assert_eq!(cache.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn stored_list_reloads_in_order() {
        let temp = temp_cache_dir();
        let cache = cache_in(&temp);
        let list = vec![
            reminder("Ibuprofeno", DayKey::Monday),
            reminder("Paracetamol", DayKey::Friday),
        ];

        cache.store(&list).await.expect("store");

        assert_eq!(cache.load().await.expect("load"), Some(list));
    }

    #[tokio::test]
    async fn clear_forgets_the_list_and_tolerates_repeats() {
        let temp = temp_cache_dir();
        let cache = cache_in(&temp);
        cache.store(&[]).await.expect("store");

        cache.clear().await.expect("clear");
        cache.clear().await.expect("clear again");

        assert_eq!(cache.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let temp = temp_cache_dir();
        let cache = cache_in(&temp);
        cache
            .dir
            .write(CACHE_FILE_NAME, b"{not json")
            .expect("write garbage");

        let error = cache.load().await.expect_err("corrupt");

        assert!(matches!(error, ReminderCacheError::Serialization { .. }));
    }
}
