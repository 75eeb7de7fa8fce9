//! Shared handler state.

use crate::error::ApiError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use log::warn;
use veille_core::{FactService, FactServiceError, HealthReport, SqliteFactRepository};

/// One migrated SQLite connection shared by all handlers, plus CORS policy.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    cors_origins: Arc<Vec<String>>,
}

impl AppState {
    /// `conn` must come from `veille_core::db::open_db*`.
    pub fn new(conn: Connection, cors_origins: Vec<String>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            cors_origins: Arc::new(cors_origins),
        }
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        self.cors_origins.iter().any(|allowed| allowed == origin)
    }

    /// Runs `op` against a fact service bound to the shared connection.
    ///
    /// The connection stays locked for the whole call; failures are mapped
    /// to [`ApiError`] with `context` naming the operation.
    pub(crate) fn with_service<T>(
        &self,
        context: &'static str,
        op: impl FnOnce(&FactService<SqliteFactRepository<'_>>) -> Result<T, FactServiceError>,
    ) -> Result<T, ApiError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ApiError::internal(context, "database connection lock poisoned"))?;
        let repo = SqliteFactRepository::try_new(&conn)
            .map_err(|err| ApiError::internal(context, err.to_string()))?;
        let service = FactService::new(repo);
        op(&service).map_err(|err| ApiError::from_service(context, err))
    }

    /// Liveness probe that reports an unusable store instead of failing.
    ///
    /// A connection the repository refuses (schema gate) counts as an
    /// unhealthy datastore; only a poisoned lock or a failed count after a
    /// good probe is an error.
    pub(crate) fn health(&self, context: &'static str) -> Result<HealthReport, ApiError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ApiError::internal(context, "database connection lock poisoned"))?;
        let repo = match SqliteFactRepository::try_new(&conn) {
            Ok(repo) => repo,
            Err(err) => {
                warn!("event=health_probe module=api status=error error={err}");
                return Ok(HealthReport {
                    database_error: Some(err.to_string()),
                    total_facts: None,
                });
            }
        };
        let service = FactService::new(repo);
        service
            .health()
            .map_err(|err| ApiError::from_service(context, err))
    }
}
