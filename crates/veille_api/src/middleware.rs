//! Router-wide middleware: CORS for the browser client and request logging.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{info, warn};
use std::time::Instant;

const ALLOWED_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "content-type";
const MAX_ORIGIN_BYTES: usize = 256;

pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let allowed_origin = request_origin(req.headers()).filter(|origin| state.allows_origin(origin));

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = allowed_origin.as_deref() {
            apply_cors_headers(resp.headers_mut(), origin);
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = allowed_origin.as_deref() {
        apply_cors_headers(resp.headers_mut(), origin);
    }
    resp
}

pub(crate) async fn request_log_middleware(req: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = next.run(req).await;

    let status = resp.status();
    if status.is_server_error() {
        warn!(
            "event=http_request module=api status=error method={} path={} http_status={} duration_ms={}",
            method,
            path,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
    } else {
        info!(
            "event=http_request module=api status=ok method={} path={} http_status={} duration_ms={}",
            method,
            path,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
    }
    resp
}

fn request_origin(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(ORIGIN)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > MAX_ORIGIN_BYTES {
        return None;
    }
    Some(value.to_string())
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(VARY, HeaderValue::from_static("origin"));
}

#[cfg(test)]
mod tests {
    use super::request_origin;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn request_origin_ignores_blank_and_oversized_values() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_origin(&headers), None);

        headers.insert("origin", HeaderValue::from_static("  "));
        assert_eq!(request_origin(&headers), None);

        let long = format!("http://{}.test", "a".repeat(300));
        headers.insert("origin", HeaderValue::from_str(&long).unwrap());
        assert_eq!(request_origin(&headers), None);

        headers.insert("origin", HeaderValue::from_static("http://localhost:5173"));
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("http://localhost:5173")
        );
    }
}
