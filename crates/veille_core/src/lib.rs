//! Core domain logic for the Veille fact catalog.
//! This crate is the single source of truth for fact invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::fact::{
    Fact, FactDraft, FactId, FactPatch, FactValidationError, FieldViolation, TECHNO_MAX_CHARS,
};
pub use repo::fact_repo::{
    FactListQuery, FactRepository, FactSearchQuery, FactSlice, RepoError, RepoResult,
    SqliteFactRepository, TechnoCount,
};
pub use service::fact_service::{
    BulkCreateOutcome, BulkEntry, BulkEntryError, FactPage, FactService, FactServiceError,
    FactStats, HealthReport, ListRequest, Pagination, SearchRequest, SearchResults,
    TechnologySummary,
};

/// Linkage probe used by `veille ping`.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn probes_answer() {
        assert_eq!(ping(), "pong");
        assert_eq!(core_version().split('.').count(), 3);
    }
}
