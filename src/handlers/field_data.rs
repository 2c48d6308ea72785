// src/handlers/field_data.rs
//
// The five REST operations over the field-data collection, plus the XLSX export.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

use crate::db::field_data::{
    delete_field_data, find_field_data, insert_field_data, list_field_data, update_field_data,
};
use crate::db::{Store, StoreStatus};
use crate::domain::{Category, FieldDataInput, FieldDataRecord, RecordId};
use crate::errors::{ResultResp, ServerError};
use crate::responses::json_response;
use crate::spreadsheets::export_field_data_xlsx;

const NOT_FOUND: &str = "Field data not found";

/// GET /api/field-data
///
/// An unconfigured store degrades to `[]`; a configured store that is not
/// connected is a 503, so "no data" and "broken" stay distinguishable.
pub fn list(store: &Store) -> ResultResp {
    match store.status() {
        StoreStatus::Unconfigured => {
            return json_response(200, &Vec::<FieldDataRecord>::new());
        }
        StoreStatus::Disconnected => {
            return Err(ServerError::ServiceUnavailable("Database not connected"));
        }
        StoreStatus::Connected => {}
    }

    let records = store.with_conn(|conn| list_field_data(conn))?;
    json_response(200, &records)
}

/// POST /api/field-data
pub fn create(store: &Store, body: &[u8]) -> ResultResp {
    ensure_available(store)?;

    let input: FieldDataInput = parse_json(body)?;
    let new = input.validate()?;

    let saved = store.with_conn(|conn| insert_field_data(conn, new, Utc::now()))?;
    info!(id = %saved.id, category = %saved.category, "field data created");

    json_response(201, &saved)
}

/// GET /api/field-data/:id
pub fn read_one(store: &Store, raw_id: &str) -> ResultResp {
    ensure_available(store)?;
    let id = parse_id(raw_id)?;

    let record = store
        .with_conn(|conn| find_field_data(conn, &id))?
        .ok_or(ServerError::NotFound(NOT_FOUND))?;
    json_response(200, &record)
}

/// PUT /api/field-data/:id
pub fn update(store: &Store, raw_id: &str, body: &[u8]) -> ResultResp {
    ensure_available(store)?;
    let id = parse_id(raw_id)?;

    let input: FieldDataInput = parse_json(body)?;
    let new = input.validate()?;

    let updated = store
        .with_conn(|conn| update_field_data(conn, &id, new))?
        .ok_or(ServerError::NotFound(NOT_FOUND))?;
    info!(id = %updated.id, "field data updated");

    json_response(200, &updated)
}

/// DELETE /api/field-data/:id
pub fn delete(store: &Store, raw_id: &str) -> ResultResp {
    ensure_available(store)?;
    let id = parse_id(raw_id)?;

    if !store.with_conn(|conn| delete_field_data(conn, &id))? {
        return Err(ServerError::NotFound(NOT_FOUND));
    }
    info!(%id, "field data deleted");

    json_response(200, &json!({ "message": "Field data deleted successfully" }))
}

/// GET /api/field-data/export.xlsx[?category=water]
pub fn export(store: &Store, query: Option<&str>) -> ResultResp {
    let category = query
        .into_iter()
        .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()))
        .find(|(k, _)| k == "category")
        .map(|(_, v)| v.parse::<Category>())
        .transpose()?;

    ensure_available(store)?;

    let mut records = store.with_conn(|conn| list_field_data(conn))?;
    if let Some(category) = category {
        records.retain(|r| r.category == category);
    }

    let suffix = category.map(|c| c.as_str()).unwrap_or("all");
    export_field_data_xlsx(&records, suffix)
}

fn ensure_available(store: &Store) -> Result<(), ServerError> {
    match store.status() {
        StoreStatus::Connected => Ok(()),
        StoreStatus::Unconfigured => Err(ServerError::ServiceUnavailable("Database not available")),
        StoreStatus::Disconnected => Err(ServerError::ServiceUnavailable("Database not connected")),
    }
}

/// Malformed ids cannot match any record, so they are reported as not found.
fn parse_id(raw: &str) -> Result<RecordId, ServerError> {
    RecordId::parse(raw).ok_or(ServerError::NotFound(NOT_FOUND))
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServerError> {
    serde_json::from_slice(body)
        .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
}
