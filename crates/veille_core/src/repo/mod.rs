//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage capability the fact service depends on.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes enforce `FactDraft::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod fact_repo;
