//! Ordered schema steps for the fact store.
//!
//! The applied step is recorded in `PRAGMA user_version`; step numbers
//! start at 1 and only ever grow.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "fact",
        sql: include_str!("0001_fact.sql"),
    },
    SchemaStep {
        version: 2,
        name: "fact_indexes",
        sql: include_str!("0002_fact_indexes.sql"),
    },
];

/// Schema version this build reads and writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`] inside one transaction.
///
/// # Errors
/// [`DbError::SchemaTooNew`] when the file comes from a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = stored_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(())
}

/// Succeeds only when `conn` is exactly at [`latest_version`].
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let found = stored_version(conn)?;
    let expected = latest_version();
    match found {
        v if v > expected => Err(DbError::SchemaTooNew {
            found,
            supported: expected,
        }),
        v if v < expected => Err(DbError::SchemaBehind { found, expected }),
        _ => Ok(()),
    }
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
