//! Atomic replacement of a file inside a capability-scoped directory.
//!
//! Contents go to a hidden sibling first and are renamed over the target, so
//! readers see either the old list or the new one, never a torn write.

use std::io::{self, Write};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};
use uuid::Uuid;

/// Replace `file` in `dir` with `contents`.
///
/// # Errors
///
/// Fails when `file` is not a bare file name or any filesystem step fails.
/// The temporary file is removed on failure.
pub(super) fn write_atomic(dir: &Dir, file: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let mut components = file.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{file} is not a bare file name"),
        ));
    };
    let temp_name = temp_name_for(file_name);

    let written = write_temp(dir, &temp_name, contents)
        .and_then(|()| replace_target(dir, &temp_name, file_name));
    if written.is_err() {
        drop(dir.remove_file(&temp_name));
    }
    written?;

    // Directory sync is advisory; the rename already happened.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}

fn temp_name_for(file_name: &str) -> String {
    format!(".{file_name}.tmp-{}", Uuid::new_v4().simple())
}

fn write_temp(dir: &Dir, temp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut handle = dir.open_with(temp_name, &options)?;
    handle.write_all(contents)?;
    handle.sync_all()
}

#[cfg(windows)]
fn replace_target(dir: &Dir, temp_name: &str, target: &str) -> io::Result<()> {
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    dir.rename(temp_name, dir, target)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, temp_name: &str, target: &str) -> io::Result<()> {
    dir.rename(temp_name, dir, target)
}
