//! # Bjorli Ledger
//!
//! A versioned score ledger for monthly game sessions. Each month holds a
//! set of players and their scores across several named games.
//!
//! ## Core Concepts
//!
//! - **Snapshots**: Immutable values holding one month's games, players and scores
//! - **Versioned files**: Every write is a new `<YYYY>_<MM>_<unix_ts>.csv`; nothing is rewritten
//! - **Locking**: Snapshots under `locked/` freeze their month against further writes
//! - **Index**: An in-memory view rebuilt from disk at startup, serving all reads
//!
//! ## Example
//!
//! ```ignore
//! use bjorli_ledger::{Ledger, LedgerConfig, MonthDate, SnapshotDraft};
//!
//! let ledger = Ledger::open(LedgerConfig::from_env()?)?;
//!
//! let snapshot = SnapshotDraft::from_json(r#"{
//!     "date": "2024-05",
//!     "locked": false,
//!     "games": [{"name": "Kubb", "scores": {"alice": 3}}],
//!     "players": ["alice", "bob"]
//! }"#)?;
//! ledger.write(snapshot)?;
//!
//! let current = ledger.read_or_empty(&MonthDate::parse("2024-05")?);
//! ```

pub mod codec;
pub mod error;
pub mod index;
pub mod store;
pub mod types;
pub mod validation;
pub mod versions;

// Re-exports
pub use codec::{decode, decode_file, encode, ScoreMatrix};
pub use error::{LedgerError, Result, ValidationError};
pub use index::{IndexEntry, LedgerIndex};
pub use store::{Ledger, LedgerConfig, LoadReport, SkippedFile, DATA_PATH_ENV};
pub use types::*;
pub use validation::{GameDraft, SnapshotDraft};
pub use versions::{
    date_from_file_name, editable_versions, file_name_for, locked_versions, newest_version,
    SnapshotLocation, SnapshotLocator, LOCKED_DIR,
};
