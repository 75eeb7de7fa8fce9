#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::ServiceExt;
use veille_api::{build_router, AppState};
use veille_core::db::open_db_in_memory;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub fn app() -> Router {
    app_with(open_db_in_memory().expect("in-memory database should open"))
}

pub fn app_with(conn: Connection) -> Router {
    build_router(AppState::new(conn, vec![ALLOWED_ORIGIN.to_string()]))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    send_raw(app, method, uri, body).await
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .expect("request should build");
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

pub async fn create(app: &Router, fact: &str, techno: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/facts",
        Some(json!({ "fact": fact, "techno": techno })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["data"].clone()
}
