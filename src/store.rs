//! Main Ledger struct tying all components together.

use crate::codec::{decode_file, encode};
use crate::error::{LedgerError, Result};
use crate::index::{IndexEntry, LedgerIndex};
use crate::types::{MonthDate, Snapshot, Timestamp};
use crate::versions::{editable_versions, locked_versions, SnapshotLocation, SnapshotLocator};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the data root.
pub const DATA_PATH_ENV: &str = "DATA_PATH";

/// File in the data root that holds the single-writer lock.
const LOCK_FILE: &str = ".ledger.lock";

/// Ledger configuration.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Directory holding editable versions and the `locked/` subdirectory.
    pub data_root: PathBuf,

    /// Whether to create the data root if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./data"),
            create_if_missing: true,
        }
    }
}

impl LedgerConfig {
    /// Configuration whose data root comes from `DATA_PATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_data_path(std::env::var_os(DATA_PATH_ENV))
    }

    fn from_data_path(value: Option<OsString>) -> Result<Self> {
        match value {
            Some(path) if !path.is_empty() => Ok(Self {
                data_root: PathBuf::from(path),
                ..Default::default()
            }),
            _ => Err(LedgerError::Config(format!("{DATA_PATH_ENV} is not set"))),
        }
    }
}

/// A versioned file left out of the index at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of the startup load.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    /// Locked versions added to the index.
    pub locked_loaded: usize,

    /// The editable version added to the index, if any.
    pub editable: Option<PathBuf>,

    /// Files that could not be used.
    pub skipped: Vec<SkippedFile>,
}

/// The score ledger.
///
/// Owns the in-memory index over a data root. Reads are served from the
/// index; every accepted write adds a new versioned file and then appends
/// to the index.
pub struct Ledger {
    /// Ledger configuration.
    config: LedgerConfig,

    /// Directory layout.
    locator: SnapshotLocator,

    /// Lock file for exclusive access.
    _lock_file: File,

    /// Month to snapshots.
    index: RwLock<LedgerIndex>,

    /// Lock for write operations to ensure atomicity. Holds the highest
    /// editable version stamp on disk, loaded or not.
    write_lock: Mutex<Option<Timestamp>>,

    /// What the startup load found.
    load_report: LoadReport,
}

impl Ledger {
    /// Open the ledger over `config.data_root` and load its history.
    pub fn open(config: LedgerConfig) -> Result<Self> {
        if !config.data_root.exists() {
            if !config.create_if_missing {
                return Err(LedgerError::Config(format!(
                    "data root {} does not exist",
                    config.data_root.display()
                )));
            }
            fs::create_dir_all(&config.data_root)?;
        }

        let lock_file = Self::acquire_lock(&config.data_root)?;
        let locator = SnapshotLocator::new(&config.data_root);
        let (index, load_report, newest_editable) = Self::load(&locator)?;

        info!(
            root = %config.data_root.display(),
            locked = load_report.locked_loaded,
            editable = load_report.editable.is_some(),
            skipped = load_report.skipped.len(),
            "ledger loaded"
        );

        Ok(Self {
            config,
            locator,
            _lock_file: lock_file,
            index: RwLock::new(index),
            write_lock: Mutex::new(newest_editable),
            load_report,
        })
    }

    /// Build the index from disk.
    ///
    /// Locked versions go in first, oldest first, so the newest locked file
    /// of a month is what reads return. Then editable versions are tried
    /// newest first and the first usable one is loaded. A version is
    /// unusable if it fails to decode, has an invalid month, or belongs to
    /// a locked month; those are skipped and reported rather than failing
    /// the whole load.
    ///
    /// Also returns the highest editable stamp seen, usable or not.
    fn load(locator: &SnapshotLocator) -> Result<(LedgerIndex, LoadReport, Option<Timestamp>)> {
        let mut index = LedgerIndex::new();
        let mut report = LoadReport::default();

        for location in locked_versions(locator.locked_dir())? {
            match Self::load_location(&location) {
                Ok(entry) => {
                    debug!(path = %location.path.display(), "loaded locked version");
                    index.append(entry);
                    report.locked_loaded += 1;
                }
                Err(e) => Self::skip(&mut report, &location, e.to_string()),
            }
        }

        let editable = editable_versions(locator.editable_dir())?;
        let newest_editable = editable.first().map(|l| l.timestamp);

        for location in editable {
            match Self::load_location(&location) {
                Ok(entry) if index.has_locked(&entry.snapshot.date) => {
                    let reason = format!("month {} is locked", entry.snapshot.date);
                    Self::skip(&mut report, &location, reason);
                }
                Ok(entry) => {
                    debug!(path = %location.path.display(), "loaded editable version");
                    index.append(entry);
                    report.editable = Some(location.path);
                    break;
                }
                Err(e) => Self::skip(&mut report, &location, e.to_string()),
            }
        }

        Ok((index, report, newest_editable))
    }

    fn load_location(location: &SnapshotLocation) -> Result<IndexEntry> {
        let date = location.month()?;
        let snapshot = decode_file(&location.path, date, location.locked)?;
        Ok(IndexEntry {
            snapshot,
            timestamp: location.timestamp,
            path: location.path.clone(),
        })
    }

    fn skip(report: &mut LoadReport, location: &SnapshotLocation, reason: String) {
        warn!(path = %location.path.display(), %reason, "skipping version file");
        report.skipped.push(SkippedFile {
            path: location.path.clone(),
            reason,
        });
    }

    // --- Write ---

    /// Accept a new snapshot for its month.
    ///
    /// Fails with [`LedgerError::LockedGame`] if the month's latest snapshot
    /// is locked. Otherwise the snapshot is written to a new versioned file
    /// (under `locked/` when the snapshot itself is locked) and only then
    /// appended to the index. On any error the index is untouched.
    pub fn write(&self, snapshot: Snapshot) -> Result<IndexEntry> {
        let mut newest_editable = self.write_lock.lock();

        let date = snapshot.date.clone();
        let month_floor = {
            let index = self.index.read();
            if index.is_locked(&date) {
                warn!(%date, "rejected write to locked month");
                return Err(LedgerError::LockedGame(date));
            }
            index.latest_timestamp(&date)
        };

        let text = encode(&snapshot)?;

        // The new file must outrank every version of its month and every
        // editable version of any month, or a restart would not pick it.
        let timestamp = match month_floor.max(*newest_editable) {
            Some(floor) => floor
                .checked_next()
                .ok_or(LedgerError::StampExhausted(floor))?
                .max(Timestamp::now()),
            None => Timestamp::now(),
        };

        let (path, timestamp) = self.persist(&date, timestamp, snapshot.locked, &text)?;
        if !snapshot.locked {
            *newest_editable = Some(timestamp);
        }

        let entry = IndexEntry {
            snapshot,
            timestamp,
            path,
        };
        self.index.write().append(entry.clone());

        info!(
            %date,
            locked = entry.snapshot.locked,
            path = %entry.path.display(),
            "snapshot written"
        );
        Ok(entry)
    }

    /// Write `text` to a fresh version file, bumping the stamp past any
    /// file that already exists. Existing files are never overwritten.
    fn persist(
        &self,
        date: &MonthDate,
        mut timestamp: Timestamp,
        locked: bool,
        text: &str,
    ) -> Result<(PathBuf, Timestamp)> {
        if locked {
            fs::create_dir_all(self.locator.locked_dir())?;
        }

        loop {
            let path = self.locator.path_for(date, timestamp, locked);
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    timestamp = timestamp
                        .checked_next()
                        .ok_or(LedgerError::StampExhausted(timestamp))?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let written = file
                .write_all(text.as_bytes())
                .and_then(|_| file.sync_all());
            if let Err(e) = written {
                drop(file);
                let _ = fs::remove_file(&path);
                return Err(e.into());
            }

            return Ok((path, timestamp));
        }
    }

    // --- Read ---

    /// Latest snapshot for `date`, or `None` if the month has no history.
    pub fn read(&self, date: &MonthDate) -> Option<Snapshot> {
        self.index.read().latest(date).map(|e| e.snapshot.clone())
    }

    /// Latest snapshot for `date`, or [`Snapshot::empty`] if there is none.
    pub fn read_or_empty(&self, date: &MonthDate) -> Snapshot {
        self.read(date)
            .unwrap_or_else(|| Snapshot::empty(date.clone()))
    }

    /// Every month with history, newest first.
    pub fn read_all_dates(&self) -> Vec<MonthDate> {
        self.index.read().dates()
    }

    /// Month of the most recent load or write.
    pub fn latest_date(&self) -> Option<MonthDate> {
        self.index.read().latest_date().cloned()
    }

    /// Every indexed entry for `date`, oldest first.
    pub fn history(&self, date: &MonthDate) -> Vec<IndexEntry> {
        self.index.read().history(date).to_vec()
    }

    /// Whether the latest snapshot for `date` is locked.
    pub fn is_locked(&self, date: &MonthDate) -> bool {
        self.index.read().is_locked(date)
    }

    /// The latest snapshot for `date` as CSV; empty when there is none.
    pub fn export_csv(&self, date: &MonthDate) -> Result<String> {
        match self.read(date) {
            Some(snapshot) => encode(&snapshot),
            None => Ok(String::new()),
        }
    }

    // --- Accessors ---

    /// What the startup load found.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Get the data root.
    pub fn path(&self) -> &Path {
        &self.config.data_root
    }

    /// Number of indexed entries across all months.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    // --- Private Helpers ---

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_file = File::create(path.join(LOCK_FILE))?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| LedgerError::InUse)?;

        Ok(lock_file)
    }
}
