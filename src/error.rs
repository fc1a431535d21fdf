//! Error types for the score ledger.

use crate::types::{MonthDate, Timestamp};
use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Cannot modify a locked game: {0}")]
    LockedGame(MonthDate),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid month: {0:?} (expected YYYY-MM)")]
    InvalidDate(String),

    #[error("No version stamp left after {0}")]
    StampExhausted(Timestamp),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger data directory is in use by another process")]
    InUse,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl LedgerError {
    pub(crate) fn parse(line: u64, reason: impl Into<String>) -> Self {
        LedgerError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(e: csv::Error) -> Self {
        LedgerError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Deserialization(e.to_string())
    }
}

/// Rejections raised at the boundary, before a `Snapshot` exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid month {0:?} (expected YYYY-MM)")]
    InvalidDate(String),

    #[error("game name {0:?} must be 2 to 50 characters")]
    GameNameLength(String),

    #[error("player name {0:?} must be 1 to 50 characters")]
    PlayerNameLength(String),

    #[error("score for {player:?} in {game:?} must be positive, got {score}")]
    NonPositiveScore {
        game: String,
        player: String,
        score: i64,
    },

    #[error("game {game:?} has a score for unknown player {player:?}")]
    UnknownPlayer { game: String, player: String },

    #[error("duplicate game {0:?}")]
    DuplicateGame(String),

    #[error("duplicate player {0:?}")]
    DuplicatePlayer(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
