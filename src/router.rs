use crate::db::Store;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::{field_data, health};
use crate::responses::{error_to_response, preflight_response, with_cors};
use astra::{Request, Response};
use std::io::Read;
use std::time::Instant;
use tracing::{debug, error};

const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Entry point for the server loop: never fails, always carries CORS headers.
pub fn respond(req: Request, store: &Store) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let resp = match handle(req, store) {
        Ok(resp) => resp,
        Err(err) => {
            if let ServerError::InternalFault(detail) = &err {
                error!(%method, %path, %detail, "request failed");
            } else {
                debug!(%method, %path, error = %err, "request rejected");
            }
            error_to_response(err)
        }
    };

    debug!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "handled request"
    );
    with_cors(resp)
}

pub fn handle(mut req: Request, store: &Store) -> ResultResp {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    let query = req.uri().query().map(str::to_owned);

    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (method.as_str(), segments.as_slice()) {
        ("OPTIONS", _) => Ok(preflight_response()),

        ("GET", ["api", "health"]) => health::health(store),

        ("GET", ["api", "field-data"]) => field_data::list(store),
        ("POST", ["api", "field-data"]) => {
            let body = read_body(&mut req)?;
            field_data::create(store, &body)
        }
        ("GET", ["api", "field-data", "export.xlsx"]) => {
            field_data::export(store, query.as_deref())
        }
        ("GET", ["api", "field-data", id]) => field_data::read_one(store, id),
        ("PUT", ["api", "field-data", id]) => {
            let body = read_body(&mut req)?;
            field_data::update(store, id, &body)
        }
        ("DELETE", ["api", "field-data", id]) => field_data::delete(store, id),

        _ => Err(ServerError::NotFound("Not found")),
    }
}

fn read_body(req: &mut Request) -> Result<Vec<u8>, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("failed to read body: {e}")))?;

    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(ServerError::BadRequest("request body too large".into()));
    }
    Ok(body)
}
