//! Fact store persistence: connection setup and schema versioning.
//!
//! A connection handed out by [`open_db`] or [`open_db_in_memory`] is always
//! at [`migrations::latest_version`]; repositories re-check that with
//! [`migrations::ensure_schema_ready`] before touching the `fact` table.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Connection could not be established for `target`.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// Database has not been migrated up to this build's schema.
    SchemaBehind { found: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "cannot open {target}: {source}"),
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "fact store schema v{found} is newer than this build (max v{supported})"
            ),
            Self::SchemaBehind { found, expected } => write!(
                f,
                "fact store schema v{found} needs migrating to v{expected}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Sqlite(source) => Some(source),
            Self::SchemaTooNew { .. } | Self::SchemaBehind { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
