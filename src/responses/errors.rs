use crate::errors::ServerError;
use astra::{Body, Response};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde_json::json;

/// Convert a ServerError into a JSON error response: `{"error": "..."}`.
///
/// Internal faults only ever carry the generic message; their detail stays in the log.
pub fn error_to_response(err: ServerError) -> Response {
    json_error_response(err.status(), &err.public_message())
}

/// Build a JSON error body. Never fails, so it is safe to use as the last resort.
pub fn json_error_response(status: u16, message: &str) -> Response {
    let body = json!({ "error": message }).to_string();

    let mut resp = Response::new(Body::from(body));
    *resp.status_mut() =
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    resp
}
