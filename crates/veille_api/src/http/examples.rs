//! `/api/examples/*` handlers: search, technology summary, bulk create,
//! random pick and health probe.

use super::facts::parse_body;
use super::params::{last_value, lenient_int, RawQuery};
use crate::error::ApiError;
use crate::state::AppState;
use crate::API_VERSION;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use veille_core::{BulkEntry, SearchRequest};

const BULK_FORMAT_MESSAGE: &str = "Request body must contain a \"facts\" array";

pub(crate) async fn hello() -> Json<Value> {
    Json(json!({
        "message": "Hello from the Veille API",
        "timestamp": now_rfc3339(),
        "version": API_VERSION,
    }))
}

pub(crate) async fn search(
    State(state): State<AppState>,
    Query(pairs): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let request = SearchRequest {
        text: last_value(&pairs, "q").map(str::to_string),
        techno: last_value(&pairs, "techno").map(str::to_string),
        limit: lenient_int(last_value(&pairs, "limit")),
    };
    let found = state.with_service("Error while searching", |service| {
        service.search(&request)
    })?;

    Ok(Json(json!({
        "query": {
            "search_term": found.search_term,
            "techno": found.techno,
            "limit": found.limit,
        },
        "count": found.results.len(),
        "results": found.results,
    })))
}

pub(crate) async fn technologies(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let summary = state.with_service("Error while fetching technologies", |service| {
        service.technologies()
    })?;
    Ok(Json(json!(summary)))
}

pub(crate) async fn bulk_create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let entries = bulk_entries(&body)?;
    let outcome = state.with_service("Error during bulk creation", |service| {
        Ok(service.bulk_create(&entries))
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Bulk creation finished",
            "created_count": outcome.created.len(),
            "created_facts": outcome.created,
            "errors": outcome.errors,
        })),
    ))
}

pub(crate) async fn random(
    State(state): State<AppState>,
    Query(pairs): RawQuery,
) -> Result<Response, ApiError> {
    let techno = last_value(&pairs, "techno").filter(|techno| !techno.is_empty());
    let picked = state.with_service("Error while picking a random fact", |service| {
        service.random_fact(techno)
    })?;

    let Some(fact) = picked else {
        let body = json!({
            "message": "No fact found",
            "suggestion": "Try another technology",
        });
        return Ok((StatusCode::NOT_FOUND, Json(body)).into_response());
    };

    let filter = match techno {
        Some(techno) => format!("Technology: {techno}"),
        None => "All technologies".to_string(),
    };
    Ok(Json(json!({ "random_fact": fact, "filter": filter })).into_response())
}

pub(crate) async fn health(State(state): State<AppState>) -> Response {
    let report = match state.health("Health check failed") {
        Ok(report) => report,
        Err(err) => {
            let body = json!({
                "status": "ERROR",
                "message": err.to_string(),
                "timestamp": now_rfc3339(),
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    let (status, label) = if report.is_healthy() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "ERROR")
    };
    let body = json!({
        "status": label,
        "timestamp": now_rfc3339(),
        "database": {
            "status": label,
            "error": report.database_error,
        },
        "statistics": { "total_facts": report.total_facts },
        "version": API_VERSION,
    });
    (status, Json(body)).into_response()
}

/// Reads `{"facts": [...]}`. Each field is read on its own: a missing or
/// non-string field is blank, its sibling is kept.
fn bulk_entries(body: &[u8]) -> Result<Vec<BulkEntry>, ApiError> {
    let payload = parse_body::<Value>(body).map_err(|_| bulk_format_error())?;
    let Some(items) = payload.get("facts").and_then(Value::as_array) else {
        return Err(bulk_format_error());
    };

    Ok(items
        .iter()
        .map(|item| BulkEntry {
            fact: string_field(item, "fact"),
            techno: string_field(item, "techno"),
        })
        .collect())
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bulk_format_error() -> ApiError {
    ApiError::Usage {
        error: "Invalid format",
        message: BULK_FORMAT_MESSAGE.to_string(),
        example: json!({
            "facts": [
                { "fact": "Texte 1", "techno": "PHP" },
                { "fact": "Texte 2", "techno": "JavaScript" },
            ]
        }),
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
