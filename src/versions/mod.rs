//! Versioned file naming and resolution.
//!
//! Every write produces a new file `<YYYY>_<MM>_<unix_ts>.csv`. Files in the
//! data root are editable versions; files in its `locked/` subdirectory are
//! frozen history. Nothing is ever rewritten or deleted.

mod locator;
mod resolver;

pub use locator::{
    date_from_file_name, file_name_for, timestamp_from_file_name, SnapshotLocation,
    SnapshotLocator, LOCKED_DIR,
};
pub use resolver::{editable_versions, locked_versions, newest_version};
