//! Mapping between versioned file paths and their metadata.

use crate::error::Result;
use crate::types::{MonthDate, Timestamp};
use std::path::{Path, PathBuf};

/// Name of the subdirectory that holds locked snapshots.
pub const LOCKED_DIR: &str = "locked";

const CSV_EXTENSION: &str = "csv";

/// What a versioned file's path says about the snapshot inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotLocation {
    pub path: PathBuf,

    /// Month as derived from the file name. Not validated; see
    /// [`SnapshotLocation::month`].
    pub date: String,

    /// True when the file lives in a `locked/` directory.
    pub locked: bool,

    /// Version stamp from the final `_` token of the file stem.
    pub timestamp: Timestamp,
}

impl SnapshotLocation {
    /// The derived month, validated.
    pub fn month(&self) -> Result<MonthDate> {
        MonthDate::parse(&self.date)
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Knows the directory layout under a data root.
///
/// ```text
/// <data_root>/
///   <YYYY>_<MM>_<unix_ts>.csv
///   locked/
///     <YYYY>_<MM>_<unix_ts>.csv
/// ```
#[derive(Clone, Debug)]
pub struct SnapshotLocator {
    root: PathBuf,
}

impl SnapshotLocator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding editable versions.
    pub fn editable_dir(&self) -> &Path {
        &self.root
    }

    /// Directory holding locked versions.
    pub fn locked_dir(&self) -> PathBuf {
        self.root.join(LOCKED_DIR)
    }

    /// Where a version of `date` stamped `timestamp` belongs.
    pub fn path_for(&self, date: &MonthDate, timestamp: Timestamp, locked: bool) -> PathBuf {
        let dir = if locked {
            self.locked_dir()
        } else {
            self.root.clone()
        };
        dir.join(file_name_for(date, timestamp))
    }

    /// Read the metadata encoded in a path.
    ///
    /// Returns `None` for anything that is not a `.csv` file with an
    /// integer version stamp.
    pub fn locate(path: impl AsRef<Path>) -> Option<SnapshotLocation> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some(CSV_EXTENSION) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let timestamp = timestamp_from_file_name(stem)?;
        let locked = path
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|name| name == LOCKED_DIR);

        Some(SnapshotLocation {
            path: path.to_path_buf(),
            date: date_from_file_name(stem),
            locked,
            timestamp,
        })
    }
}

/// Derive the month from a file stem.
///
/// `_` becomes `-` and the first two `-` segments are kept, so
/// `2024_05_1716400000` gives `2024-05`. A stem with fewer than two
/// segments comes back unchanged.
pub fn date_from_file_name(stem: &str) -> String {
    let dashed = stem.replace('_', "-");
    let segments: Vec<&str> = dashed.split('-').collect();
    if segments.len() < 2 {
        return stem.to_string();
    }
    segments[..2].join("-")
}

/// Parse the token after the final `_` as the version stamp.
pub fn timestamp_from_file_name(stem: &str) -> Option<Timestamp> {
    stem.rsplit('_').next()?.parse().ok().map(Timestamp)
}

/// `<YYYY>_<MM>_<ts>.csv`
pub fn file_name_for(date: &MonthDate, timestamp: Timestamp) -> String {
    format!("{}_{}.{}", date.file_prefix(), timestamp, CSV_EXTENSION)
}
