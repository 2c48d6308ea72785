// src/domain/field_data.rs

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::input::ValidationError;

/// The closed set of observation categories a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Water,
    Health,
    Climate,
    Environment,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Water,
        Category::Health,
        Category::Climate,
        Category::Environment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Water => "water",
            Category::Health => "health",
            Category::Climate => "climate",
            Category::Environment => "environment",
        }
    }

    /// Human readable name used in charts and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Water => "Water Quality",
            Category::Health => "Health Screening",
            Category::Climate => "Climate Monitoring",
            Category::Environment => "Environmental",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Exact match only. "Water" or " water" are rejected rather than coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidCategory(s.to_string()))
    }
}

/// Store-assigned record identifier: 24 lowercase hex characters.
///
/// The first 4 bytes are the big-endian creation second, the remaining 8 are random,
/// so ids sort roughly by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub const LEN: usize = 24;

    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut random = [0u8; 8];
        OsRng.fill_bytes(&mut random);

        let secs = now.timestamp().clamp(0, u32::MAX as i64) as u32;
        let mut bytes = Vec::with_capacity(12);
        bytes.extend_from_slice(&secs.to_be_bytes());
        bytes.extend_from_slice(&random);

        RecordId(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Returns `None` for anything that is not 24 hex characters.
    /// Upper-case hex is accepted and normalized.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != Self::LEN || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(RecordId(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One field-collected observation, as stored and as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDataRecord {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    pub category: Category,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub description: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub time_taken: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl FieldDataRecord {
    /// Both coordinates, or nothing. A record with only one of the pair cannot be pinned.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}
