// src/db/field_data.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::connection::StoreError;
use crate::domain::input::truncate_to_millis;
use crate::domain::{Category, FieldDataRecord, NewFieldData, RecordId};

const COLUMNS: &str = "id, title, category, location, latitude, longitude, description, \
                       user_id, time_taken, created_at";

/// All records, newest first.
pub fn list_field_data(conn: &Connection) -> Result<Vec<FieldDataRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "select {COLUMNS} from field_data order by created_at desc, seq desc"
    ))?;

    let rows = stmt.query_map([], raw_row)?;

    let mut records = Vec::new();
    for r in rows {
        records.push(r?.into_record()?);
    }
    Ok(records)
}

/// Persist a validated payload, assigning its id and defaulting `created_at` to `now`.
pub fn insert_field_data(
    conn: &Connection,
    new: NewFieldData,
    now: DateTime<Utc>,
) -> Result<FieldDataRecord, StoreError> {
    let created_at = truncate_to_millis(new.created_at.unwrap_or(now));
    let record = new.into_record(RecordId::generate(now), created_at);

    conn.execute(
        "insert into field_data (id, title, category, location, latitude, longitude, \
         description, user_id, time_taken, created_at) \
         values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            record.id.as_str(),
            record.title,
            record.category.as_str(),
            record.location,
            record.latitude,
            record.longitude,
            record.description,
            record.user_id,
            record.time_taken,
            record.created_at.timestamp_millis(),
        ],
    )?;

    Ok(record)
}

pub fn find_field_data(
    conn: &Connection,
    id: &RecordId,
) -> Result<Option<FieldDataRecord>, StoreError> {
    let row = conn
        .query_row(
            &format!("select {COLUMNS} from field_data where id = ?"),
            params![id.as_str()],
            raw_row,
        )
        .optional()?;

    row.map(RawRow::into_record).transpose()
}

/// Replace every mutable field. `id` and `created_at` are left alone.
/// Returns `None` when no record has this id.
pub fn update_field_data(
    conn: &mut Connection,
    id: &RecordId,
    new: NewFieldData,
) -> Result<Option<FieldDataRecord>, StoreError> {
    let tx = conn.transaction()?;

    let changed = tx.execute(
        "update field_data set title = ?, category = ?, location = ?, latitude = ?, \
         longitude = ?, description = ?, user_id = ?, time_taken = ? where id = ?",
        params![
            new.title,
            new.category.as_str(),
            new.location,
            new.latitude,
            new.longitude,
            new.description,
            new.user_id,
            new.time_taken,
            id.as_str(),
        ],
    )?;

    if changed == 0 {
        return Ok(None);
    }

    let updated = find_field_data(&tx, id)?;
    tx.commit()?;
    Ok(updated)
}

/// Returns whether a record was removed.
pub fn delete_field_data(conn: &Connection, id: &RecordId) -> Result<bool, StoreError> {
    let removed = conn.execute("delete from field_data where id = ?", params![id.as_str()])?;
    Ok(removed > 0)
}

/// Column values as stored, before domain checks.
struct RawRow {
    id: String,
    title: String,
    category: String,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    description: String,
    user_id: Option<String>,
    time_taken: Option<f64>,
    created_at: i64,
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        location: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        description: row.get(6)?,
        user_id: row.get(7)?,
        time_taken: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl RawRow {
    fn into_record(self) -> Result<FieldDataRecord, StoreError> {
        let id = RecordId::parse(&self.id)
            .ok_or_else(|| StoreError::Corrupt(format!("malformed id {:?}", self.id)))?;
        let category = self
            .category
            .parse::<Category>()
            .map_err(|e| StoreError::Corrupt(format!("row {id}: {e}")))?;
        let created_at = DateTime::from_timestamp_millis(self.created_at).ok_or_else(|| {
            StoreError::Corrupt(format!("row {id}: created_at {} out of range", self.created_at))
        })?;

        Ok(FieldDataRecord {
            id,
            title: self.title,
            category,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description,
            user_id: self.user_id,
            time_taken: self.time_taken,
            created_at,
        })
    }
}
