// src/domain/input.rs

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::field_data::{Category, FieldDataRecord, RecordId};

/// Schema violations. These are rejected before anything reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("`{0}` is required")]
    Missing(&'static str),
    #[error("`{0}` is not a valid category (expected water, health, climate or environment)")]
    InvalidCategory(String),
    #[error("`{0}` must be a finite number")]
    NotFinite(&'static str),
}

/// Raw create/update payload as it arrives over the wire.
///
/// Everything is optional here so that missing fields surface as a
/// `ValidationError` with the field name, not as an opaque decode error.
/// Numeric fields also take numeric strings, and `""` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDataInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<f64>,
    #[serde(
        default,
        deserialize_with = "loose_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_taken: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A payload that passed schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFieldData {
    pub title: String,
    pub category: Category,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub user_id: Option<String>,
    pub time_taken: Option<f64>,
    /// Only honoured on create.
    pub created_at: Option<DateTime<Utc>>,
}

impl FieldDataInput {
    pub fn validate(self) -> Result<NewFieldData, ValidationError> {
        let title = required(self.title, "title")?;
        let category = required(self.category, "category")?.parse::<Category>()?;
        let location = required(self.location, "location")?;
        let description = required(self.description, "description")?;

        Ok(NewFieldData {
            title,
            category,
            location,
            latitude: finite(self.latitude, "latitude")?,
            longitude: finite(self.longitude, "longitude")?,
            description,
            user_id: self.user_id,
            time_taken: finite(self.time_taken, "time_taken")?,
            created_at: self.created_at.map(truncate_to_millis),
        })
    }
}

impl NewFieldData {
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> FieldDataRecord {
        FieldDataRecord {
            id,
            title: self.title,
            category: self.category,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description,
            user_id: self.user_id,
            time_taken: self.time_taken,
            created_at,
        }
    }
}

impl From<&FieldDataRecord> for FieldDataInput {
    fn from(r: &FieldDataRecord) -> Self {
        FieldDataInput {
            title: Some(r.title.clone()),
            category: Some(r.category.as_str().to_string()),
            location: Some(r.location.clone()),
            latitude: r.latitude,
            longitude: r.longitude,
            description: Some(r.description.clone()),
            user_id: r.user_id.clone(),
            time_taken: r.time_taken,
            created_at: None,
        }
    }
}

/// Timestamps are stored at millisecond precision; truncating up front keeps
/// the create response identical to what a later read returns.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Strings are stored exactly as sent; only absent or empty values count as missing.
fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing(field))
}

fn finite(value: Option<f64>, field: &'static str) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::NotFinite(field)),
        other => Ok(other),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

fn loose_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(d)? {
        None => Ok(None),
        Some(Loose::Number(n)) => Ok(Some(n)),
        Some(Loose::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}")))
        }
    }
}

fn loose_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(d)? {
        None => Ok(None),
        Some(Loose::Text(s)) => Ok(Some(s)),
        Some(Loose::Number(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
            Ok(Some(format!("{}", n as i64)))
        }
        Some(Loose::Number(n)) => Ok(Some(n.to_string())),
    }
}
