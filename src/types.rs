//! Core types for the score ledger.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A single cell of the score matrix.
///
/// Decoded files may carry zero (the export default for a missing score),
/// so this is a plain integer; positivity is checked by
/// [`SnapshotDraft::validate`](crate::validation::SnapshotDraft::validate).
pub type Score = i64;

/// A month in strict `YYYY-MM` form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDate(String);

impl MonthDate {
    /// Parse a `YYYY-MM` string. The month must be in `01..=12`.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(LedgerError::InvalidDate(s.to_string()));
        }

        let month: u8 = s[5..]
            .parse()
            .map_err(|_| LedgerError::InvalidDate(s.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidDate(s.to_string()));
        }

        Ok(MonthDate(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> u16 {
        self.0[..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u8 {
        self.0[5..].parse().unwrap_or_default()
    }

    /// `YYYY_MM`, the prefix of every versioned file for this month.
    pub fn file_prefix(&self) -> String {
        self.0.replace('-', "_")
    }
}

impl FromStr for MonthDate {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        MonthDate::parse(s)
    }
}

impl TryFrom<String> for MonthDate {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self> {
        MonthDate::parse(&s)
    }
}

impl From<MonthDate> for String {
    fn from(date: MonthDate) -> Self {
        date.0
    }
}

impl fmt::Debug for MonthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonthDate({})", self.0)
    }
}

impl fmt::Display for MonthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seconds since Unix epoch. Used as the version stamp in file names.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Timestamp(secs)
    }

    /// The following second, or `None` at `u64::MAX`.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Timestamp)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One named game and the scores recorded for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,

    /// Player name to score. Every key is a player of the owning snapshot.
    pub scores: BTreeMap<String, Score>,
}

impl Game {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scores: BTreeMap::new(),
        }
    }

    /// Add a score (builder style).
    pub fn with_score(mut self, player: impl Into<String>, score: Score) -> Self {
        self.scores.insert(player.into(), score);
        self
    }
}

/// One month's complete game, player and score state.
///
/// Snapshots are values: an edit is a new snapshot handed to
/// [`Ledger::write`](crate::store::Ledger::write), never a mutation of a
/// stored one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: MonthDate,

    /// Once a locked snapshot is the latest for its month, no later
    /// snapshot for that month is accepted.
    pub locked: bool,

    /// Games in column order.
    pub games: Vec<Game>,

    /// Players in row order.
    pub players: Vec<String>,
}

impl Snapshot {
    /// The "no data" value for a month nobody has written yet.
    pub fn empty(date: MonthDate) -> Self {
        Self {
            date,
            locked: false,
            games: Vec::new(),
            players: Vec::new(),
        }
    }

    /// Look up a game by name.
    pub fn game(&self, name: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.name == name)
    }

    /// Score of `player` in `game`, if recorded.
    pub fn score(&self, player: &str, game: &str) -> Option<Score> {
        self.game(game).and_then(|g| g.scores.get(player).copied())
    }

    /// Whether the snapshot holds no games and no players.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty() && self.players.is_empty()
    }
}
