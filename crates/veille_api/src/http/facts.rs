//! `/api/facts` handlers.

use super::params::{last_value, lenient_int, parse_fact_id, RawQuery};
use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use veille_core::{FactDraft, FactId, FactPatch, ListRequest};

/// Create/replace payload; absent fields validate as blank.
#[derive(Debug, Default, Deserialize)]
struct FactBody {
    #[serde(default)]
    fact: Option<String>,
    #[serde(default)]
    techno: Option<String>,
}

impl FactBody {
    fn into_draft(self) -> FactDraft {
        FactDraft::new(self.fact.unwrap_or_default(), self.techno.unwrap_or_default())
    }
}

pub(crate) async fn list_facts(
    State(state): State<AppState>,
    Query(pairs): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let request = ListRequest {
        page: lenient_int(last_value(&pairs, "page")),
        limit: lenient_int(last_value(&pairs, "limit")),
        techno: last_value(&pairs, "techno").map(str::to_string),
    };
    let page = state.with_service("Error while fetching facts", |service| {
        service.list_facts(&request)
    })?;

    Ok(Json(json!({
        "data": page.items,
        "pagination": page.pagination,
        "filters": { "techno": page.techno },
    })))
}

pub(crate) async fn get_fact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = fact_id(&raw_id)?;
    let fact = state.with_service("Error while fetching the fact", |service| {
        service.get_fact(id)
    })?;
    Ok(Json(json!({ "data": fact })))
}

pub(crate) async fn create_fact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let draft = parse_body::<FactBody>(&body)?.into_draft();
    let fact = state.with_service("Error while creating the fact", |service| {
        service.create_fact(&draft)
    })?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Fact created successfully",
            "data": fact,
        })),
    ))
}

pub(crate) async fn replace_fact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = fact_id(&raw_id)?;
    let parsed = parse_body::<FactBody>(&body);
    let fact = state.with_service("Error while updating the fact", |service| {
        service.get_fact(id)?;
        match parsed {
            Ok(body) => service.replace_fact(id, &body.into_draft()).map(Ok),
            Err(err) => Ok(Err(err)),
        }
    })??;
    Ok(Json(json!({
        "message": "Fact updated successfully",
        "data": fact,
    })))
}

pub(crate) async fn patch_fact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = fact_id(&raw_id)?;
    let parsed = parse_body::<FactPatch>(&body);
    let fact = state.with_service("Error while updating the fact", |service| {
        service.get_fact(id)?;
        match parsed {
            Ok(patch) => service.patch_fact(id, &patch).map(Ok),
            Err(err) => Ok(Err(err)),
        }
    })??;
    Ok(Json(json!({
        "message": "Fact partially updated successfully",
        "data": fact,
    })))
}

pub(crate) async fn delete_fact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = fact_id(&raw_id)?;
    let deleted_id = state.with_service("Error while deleting the fact", |service| {
        service.delete_fact(id)
    })?;
    Ok(Json(json!({
        "message": "Fact deleted successfully",
        "deleted_id": deleted_id,
    })))
}

pub(crate) async fn fact_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.with_service("Error while computing statistics", |service| {
        service.stats()
    })?;
    Ok(Json(json!({ "data": stats })))
}

fn fact_id(raw: &str) -> Result<FactId, ApiError> {
    parse_fact_id(raw).ok_or_else(|| ApiError::NotFound(raw.to_string()))
}

pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::InvalidJson(err.to_string()))
}
