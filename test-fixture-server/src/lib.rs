//! Router for a tiny HTTP server whose responses are deliberately
//! sensitive to a handful of headers and body fields, so the minimization
//! engine has something non-trivial to converge on in integration tests.

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
struct EchoResponse {
    message: &'static str,
    header_count: usize,
}

/// Always returns 200 with a fixed body, regardless of headers/body sent.
/// Every header and every body field is redundant here.
async fn echo(headers: HeaderMap) -> impl IntoResponse {
    Json(EchoResponse {
        message: "ok",
        header_count: headers.len(),
    })
}

/// 200 only when `X-Required: yes` is present; every other header is
/// redundant.
async fn essential_header(headers: HeaderMap) -> impl IntoResponse {
    match headers.get("x-required").and_then(|v| v.to_str().ok()) {
        Some("yes") => (StatusCode::OK, "granted").into_response(),
        _ => (StatusCode::FORBIDDEN, "missing X-Required").into_response(),
    }
}

/// 200 only when the JSON body's top-level `important` field equals
/// `"present"`; every other field (and nested structure under other
/// keys) is redundant.
async fn json_field(body: String) -> impl IntoResponse {
    let parsed: Result<Value, _> = serde_json::from_str(&body);
    match parsed {
        Ok(value) if value.get("important").and_then(Value::as_str) == Some("present") => {
            (StatusCode::OK, "accepted").into_response()
        }
        Ok(_) => (StatusCode::BAD_REQUEST, "missing important=present").into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid json").into_response(),
    }
}

/// 200 only when the form body carries `token=secret`; every other field
/// is redundant.
async fn form_field(body: String) -> impl IntoResponse {
    let fields: HashMap<String, String> = form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    match fields.get("token").map(String::as_str) {
        Some("secret") => (StatusCode::OK, "accepted").into_response(),
        _ => (StatusCode::UNAUTHORIZED, "missing token=secret").into_response(),
    }
}

#[derive(Deserialize)]
struct LengthParams {
    verbose: Option<String>,
}

/// Response body length depends on `?verbose=1`, for comparator tests
/// that key off `length_check`/`length_tolerance` instead of exact body
/// equality.
async fn length_sensitive(Query(params): Query<LengthParams>) -> impl IntoResponse {
    let verbose = params.verbose.as_deref() == Some("1");
    if verbose {
        (StatusCode::OK, "x".repeat(500))
    } else {
        (StatusCode::OK, "x".repeat(50))
    }
}

pub fn build_router() -> Router {
    Router::new()
        .route("/echo", get(echo).post(echo))
        .route("/essential-header", get(essential_header))
        .route("/json-field", post(json_field))
        .route("/form-field", post(form_field))
        .route("/length-sensitive", get(length_sensitive))
        .layer(TraceLayer::new_for_http())
}
