//! Directory scans that pick out current and historical versions.

use super::locator::{SnapshotLocation, SnapshotLocator};
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// The newest version directly inside `dir`.
///
/// Subdirectories (including `locked/`) are not searched. The highest
/// version stamp wins; equal stamps fall back to the file name. `None`
/// means no editable snapshot exists yet.
pub fn newest_version(dir: impl AsRef<Path>) -> Result<Option<SnapshotLocation>> {
    Ok(editable_versions(dir)?.into_iter().next())
}

/// Every version directly inside `dir`, newest first.
///
/// Same ordering as [`newest_version`], so a caller can fall back to older
/// versions when the newest one is unusable.
pub fn editable_versions(dir: impl AsRef<Path>) -> Result<Vec<SnapshotLocation>> {
    let mut versions = scan(dir.as_ref())?;
    versions.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.path.cmp(&a.path))
    });
    Ok(versions)
}

/// Every version in a locked directory, oldest first.
///
/// No reduction happens: a month with several locked files yields several
/// locations. A missing directory yields an empty list.
pub fn locked_versions(dir: impl AsRef<Path>) -> Result<Vec<SnapshotLocation>> {
    let mut versions = scan(dir.as_ref())?;
    versions.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(versions)
}

fn scan(dir: &Path) -> Result<Vec<SnapshotLocation>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "version directory missing");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        match SnapshotLocator::locate(&path) {
            Some(location) => found.push(location),
            None if path.extension().is_some_and(|e| e == "csv") => {
                warn!(path = %path.display(), "ignoring csv file without a version stamp");
            }
            None => {}
        }
    }
    Ok(found)
}
