//! Routing table and request handlers.

mod examples;
mod facts;
mod params;

use crate::middleware::{cors_middleware, request_log_middleware};
use crate::state::AppState;
use axum::http::{StatusCode, Uri};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/facts", get(facts::list_facts).post(facts::create_fact))
        .route("/api/facts/stats", get(facts::fact_stats))
        .route(
            "/api/facts/{id}",
            get(facts::get_fact)
                .put(facts::replace_fact)
                .patch(facts::patch_fact)
                .delete(facts::delete_fact),
        )
        .route("/api/examples/hello", get(examples::hello))
        .route("/api/examples/search", get(examples::search))
        .route("/api/examples/technologies", get(examples::technologies))
        .route("/api/examples/bulk-create", post(examples::bulk_create))
        .route("/api/examples/random", get(examples::random))
        .route("/api/examples/health", get(examples::health))
        .fallback(unknown_route)
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .layer(from_fn(request_log_middleware))
        .with_state(state)
}

async fn unknown_route(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": format!("No route matches `{}`", uri.path()),
        })),
    )
}
