//! In-memory index over the versioned files.
//!
//! The index is never persisted. It is rebuilt from disk at startup and
//! appended to on every successful write, so reads never touch disk.

use crate::types::{MonthDate, Snapshot, Timestamp};
use std::collections::HashMap;
use std::path::PathBuf;

/// One snapshot as it entered the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub snapshot: Snapshot,

    /// Version stamp of the file that holds this snapshot.
    pub timestamp: Timestamp,

    /// The file that holds this snapshot.
    pub path: PathBuf,
}

/// Month to snapshots, in append order, plus the most recently touched month.
#[derive(Debug, Default)]
pub struct LedgerIndex {
    months: HashMap<MonthDate, Vec<IndexEntry>>,

    /// One element per appended entry.
    date_log: Vec<MonthDate>,

    latest_date: Option<MonthDate>,
}

impl LedgerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for its month and move the latest-date pointer.
    pub fn append(&mut self, entry: IndexEntry) {
        let date = entry.snapshot.date.clone();
        self.months.entry(date.clone()).or_default().push(entry);
        self.date_log.push(date.clone());
        self.latest_date = Some(date);
    }

    /// Most recently appended entry for `date`.
    pub fn latest(&self, date: &MonthDate) -> Option<&IndexEntry> {
        self.months.get(date).and_then(|entries| entries.last())
    }

    /// Every entry for `date`, oldest first.
    pub fn history(&self, date: &MonthDate) -> &[IndexEntry] {
        self.months.get(date).map(Vec::as_slice).unwrap_or_default()
    }

    /// Lock state of the latest entry; unseen months are unlocked.
    pub fn is_locked(&self, date: &MonthDate) -> bool {
        self.latest(date).is_some_and(|e| e.snapshot.locked)
    }

    /// Whether any entry for `date` is locked.
    pub fn has_locked(&self, date: &MonthDate) -> bool {
        self.history(date).iter().any(|e| e.snapshot.locked)
    }

    /// Highest version stamp recorded for `date`.
    pub fn latest_timestamp(&self, date: &MonthDate) -> Option<Timestamp> {
        self.history(date).iter().map(|e| e.timestamp).max()
    }

    /// Distinct months, newest first.
    pub fn dates(&self) -> Vec<MonthDate> {
        let mut dates = self.date_log.clone();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }

    /// Month of the most recent append.
    pub fn latest_date(&self) -> Option<&MonthDate> {
        self.latest_date.as_ref()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.date_log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date_log.is_empty()
    }
}
