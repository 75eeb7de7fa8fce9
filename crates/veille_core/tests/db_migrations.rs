use rusqlite::Connection;
use veille_core::db::migrations::{ensure_schema_ready, latest_version};
use veille_core::db::{open_db, open_db_in_memory, DbError};
use veille_core::{RepoError, SqliteFactRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "fact");
    assert_index_exists(&conn, "idx_fact_techno");
    assert_index_exists(&conn, "idx_fact_date_enregistrement");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("veille.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO fact (fact, techno, date_enregistrement) VALUES ('kept', 'Rust', 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let rows: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM fact;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        ensure_schema_ready(&conn),
        Err(DbError::SchemaBehind { found: 0, .. })
    ));
    let err = SqliteFactRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::Db(DbError::SchemaBehind { .. })));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
