//! Connection setup for the fact store.

use super::migrations::{apply_migrations, latest_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy)]
enum Target<'a> {
    File(&'a Path),
    Memory,
}

impl Display for Target<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "`{}`", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// Opens (creating if needed) the fact database at `path` and migrates it.
///
/// File databases are switched to WAL so the API can read while the CLI
/// reloads the catalog.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_target(Target::File(path), || Connection::open(path))
}

/// Opens a private in-memory fact database; used by tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(Target::Memory, Connection::open_in_memory)
}

fn open_target(
    target: Target<'_>,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();

    let result = connect()
        .map_err(|source| DbError::Open {
            target: target.to_string(),
            source,
        })
        .and_then(|mut conn| {
            prepare(&mut conn, target)?;
            Ok(conn)
        });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok target={} schema_version={} duration_ms={}",
            target,
            latest_version(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error target={} duration_ms={} error={}",
            target,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn prepare(conn: &mut Connection, target: Target<'_>) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if let Target::File(_) = target {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    }
    apply_migrations(conn)
}

#[cfg(test)]
mod tests {
    use super::Target;
    use std::path::Path;

    #[test]
    fn target_names_file_or_memory() {
        assert_eq!(Target::File(Path::new("/tmp/f.db")).to_string(), "`/tmp/f.db`");
        assert_eq!(Target::Memory.to_string(), ":memory:");
    }
}
