//! Domain model for the fact catalog.
//!
//! # Invariants
//! - Every fact is identified by a store-assigned integer id that is never reused.
//! - `date_enregistrement` is fixed at creation.

pub mod fact;
