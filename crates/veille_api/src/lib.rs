//! HTTP surface for the Veille fact catalog.
//!
//! Maps `/api/facts` and `/api/examples/*` onto [`veille_core::FactService`]
//! and serializes every failure into a uniform JSON error body.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod http;
mod middleware;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http::build_router;
pub use state::AppState;

/// Version string reported by `hello` and `health`.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
