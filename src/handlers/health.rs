use crate::db::Store;
use crate::errors::ResultResp;
use crate::responses::json_response;
use serde_json::json;

/// Liveness plus the store's lifecycle state. Always 200: a missing store is
/// a configuration state, not an outage of this process.
pub fn health(store: &Store) -> ResultResp {
    json_response(
        200,
        &json!({ "status": "ok", "store": store.status().as_str() }),
    )
}
