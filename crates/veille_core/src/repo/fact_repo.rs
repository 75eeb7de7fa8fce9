//! Fact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, aggregate and random-pick APIs over the `fact` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `FactDraft::validate()` before SQL mutations.
//! - `date_enregistrement` is written by `insert_fact` only.
//! - Listing order is `date_enregistrement DESC, id DESC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::ensure_schema_ready;
use crate::db::DbError;
use crate::model::fact::{Fact, FactDraft, FactId, FactValidationError};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FACT_SELECT_SQL: &str = "SELECT
    id,
    fact,
    techno,
    date_enregistrement
FROM fact";

const FACT_ORDER_SQL: &str = " ORDER BY date_enregistrement DESC, id DESC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for fact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(FactValidationError),
    Db(DbError),
    NotFound(FactId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "fact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted fact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<FactValidationError> for RepoError {
    fn from(value: FactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and window for paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactListQuery {
    /// Exact-match technology filter.
    pub techno: Option<String>,
    pub offset: u64,
    pub limit: u32,
}

/// One listing window plus the unwindowed match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSlice {
    pub items: Vec<Fact>,
    pub total: u64,
}

/// Combined free-text and technology filter, ANDed when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSearchQuery {
    /// Substring matched against `fact` (ASCII case-insensitive).
    pub text: Option<String>,
    /// Exact-match technology filter.
    pub techno: Option<String>,
    pub limit: u32,
}

/// Number of facts carrying one technology tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnoCount {
    pub techno: String,
    pub count: u64,
}

/// Storage capability required by the fact service.
pub trait FactRepository {
    /// Inserts a validated draft; assigns id and creation timestamp.
    fn insert_fact(&self, draft: &FactDraft) -> RepoResult<Fact>;
    fn get_fact(&self, id: FactId) -> RepoResult<Option<Fact>>;
    fn list_facts(&self, query: &FactListQuery) -> RepoResult<FactSlice>;
    /// Replaces `fact`/`techno`; returns `NotFound` for unknown ids.
    fn update_fact(&self, id: FactId, draft: &FactDraft) -> RepoResult<Fact>;
    /// Returns `false` when no row had this id.
    fn delete_fact(&self, id: FactId) -> RepoResult<bool>;
    fn count_facts(&self) -> RepoResult<u64>;
    /// Counts per technology, largest first, ties by name.
    fn count_by_techno(&self) -> RepoResult<Vec<TechnoCount>>;
    fn recent_facts(&self, limit: u32) -> RepoResult<Vec<Fact>>;
    fn search_facts(&self, query: &FactSearchQuery) -> RepoResult<Vec<Fact>>;
    /// Uniform pick among matching rows.
    fn random_fact(&self, techno: Option<&str>) -> RepoResult<Option<Fact>>;
    /// Removes every row and returns how many were deleted.
    fn clear_facts(&self) -> RepoResult<usize>;
    /// Round-trips a trivial statement to prove the datastore answers.
    fn ping(&self) -> RepoResult<()>;
}

/// SQLite-backed fact repository.
pub struct SqliteFactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFactRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FactRepository for SqliteFactRepository<'_> {
    fn insert_fact(&self, draft: &FactDraft) -> RepoResult<Fact> {
        draft.validate()?;

        let created_at = now_millis()?;
        self.conn.execute(
            "INSERT INTO fact (fact, techno, date_enregistrement) VALUES (?1, ?2, ?3);",
            params![
                draft.fact.as_str(),
                draft.techno.as_str(),
                created_at.timestamp_millis()
            ],
        )?;

        Ok(Fact {
            id: self.conn.last_insert_rowid(),
            fact: draft.fact.clone(),
            techno: draft.techno.clone(),
            date_enregistrement: created_at,
        })
    }

    fn get_fact(&self, id: FactId) -> RepoResult<Option<Fact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_fact_row(row)?));
        }

        Ok(None)
    }

    fn list_facts(&self, query: &FactListQuery) -> RepoResult<FactSlice> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(techno) = query.techno.as_ref() {
            where_sql.push_str(" AND techno = ?");
            bind_values.push(Value::Text(techno.clone()));
        }

        let total = self.conn.query_row(
            &format!("SELECT COUNT(id) FROM fact{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get::<_, i64>(0),
        )?;

        let sql = format!("{FACT_SELECT_SQL}{where_sql}{FACT_ORDER_SQL} LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(
            i64::try_from(query.offset).unwrap_or(i64::MAX),
        ));

        let items = self.query_facts(&sql, bind_values)?;
        Ok(FactSlice {
            items,
            total: count_from_db(total)?,
        })
    }

    fn update_fact(&self, id: FactId, draft: &FactDraft) -> RepoResult<Fact> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE fact SET fact = ?2, techno = ?3 WHERE id = ?1;",
            params![id, draft.fact.as_str(), draft.techno.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_fact(id)?.ok_or(RepoError::NotFound(id))
    }

    fn delete_fact(&self, id: FactId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM fact WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn count_facts(&self) -> RepoResult<u64> {
        let total = self
            .conn
            .query_row("SELECT COUNT(id) FROM fact;", [], |row| row.get::<_, i64>(0))?;
        count_from_db(total)
    }

    fn count_by_techno(&self) -> RepoResult<Vec<TechnoCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT techno, COUNT(id) AS count
             FROM fact
             GROUP BY techno
             ORDER BY count DESC, techno ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push(TechnoCount {
                techno: row.get("techno")?,
                count: count_from_db(row.get("count")?)?,
            });
        }

        Ok(counts)
    }

    fn recent_facts(&self, limit: u32) -> RepoResult<Vec<Fact>> {
        self.query_facts(
            &format!("{FACT_SELECT_SQL}{FACT_ORDER_SQL} LIMIT ?;"),
            vec![Value::Integer(i64::from(limit))],
        )
    }

    fn search_facts(&self, query: &FactSearchQuery) -> RepoResult<Vec<Fact>> {
        let mut sql = format!("{FACT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(text) = query.text.as_ref() {
            sql.push_str(" AND fact LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(format!("%{}%", escape_like(text))));
        }

        if let Some(techno) = query.techno.as_ref() {
            sql.push_str(" AND techno = ?");
            bind_values.push(Value::Text(techno.clone()));
        }

        sql.push_str(FACT_ORDER_SQL);
        sql.push_str(" LIMIT ?;");
        bind_values.push(Value::Integer(i64::from(query.limit)));

        self.query_facts(&sql, bind_values)
    }

    fn random_fact(&self, techno: Option<&str>) -> RepoResult<Option<Fact>> {
        let mut sql = String::from(FACT_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(techno) = techno {
            sql.push_str(" WHERE techno = ?");
            bind_values.push(Value::Text(techno.to_string()));
        }
        sql.push_str(" ORDER BY RANDOM() LIMIT 1;");

        Ok(self.query_facts(&sql, bind_values)?.into_iter().next())
    }

    fn clear_facts(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM fact;", [])?)
    }

    fn ping(&self) -> RepoResult<()> {
        let one = self
            .conn
            .query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
            .optional()?;
        match one {
            Some(1) => Ok(()),
            other => Err(RepoError::InvalidData(format!(
                "liveness probe returned {other:?}"
            ))),
        }
    }
}

impl SqliteFactRepository<'_> {
    fn query_facts(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Fact>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut facts = Vec::new();
        while let Some(row) = rows.next()? {
            facts.push(parse_fact_row(row)?);
        }

        Ok(facts)
    }
}

fn parse_fact_row(row: &Row<'_>) -> RepoResult<Fact> {
    let id: FactId = row.get("id")?;
    let millis: i64 = row.get("date_enregistrement")?;
    let date_enregistrement = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{millis}` in fact.date_enregistrement for id {id}"
        ))
    })?;

    let fact = Fact {
        id,
        fact: row.get("fact")?,
        techno: row.get("techno")?,
        date_enregistrement,
    };
    FactDraft::from(&fact).validate().map_err(|err| {
        RepoError::InvalidData(format!("row {id} violates fact invariants: {err}"))
    })?;
    Ok(fact)
}

fn now_millis() -> RepoResult<DateTime<Utc>> {
    let millis = Utc::now().timestamp_millis();
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| RepoError::InvalidData(format!("clock returned unusable time {millis}")))
}

fn count_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative count {value}")))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
