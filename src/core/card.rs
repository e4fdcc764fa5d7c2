//! Card - The persisted unit of generated content
//!
//! A card is created once by a successful generation and never updated.
//!
//! # Fields
//! - **id**: assigned by the store, strictly increasing, never reused
//! - **subtopics**: ordered list, stored as a JSON array of strings
//! - **timestamp**: assigned by the store clock unless supplied
//! - **temperature / max_tokens**: generation parameters (nullable columns)

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Temperature recorded when a card carries none
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Max tokens recorded when a card carries none
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// A stored card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub topic: String,
    pub summary: String,
    pub subtopics: Vec<String>,
    pub model: String,
    pub language: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Input to [`CardStore::save`](super::store::CardStore::save)
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub topic: String,
    pub summary: String,
    pub subtopics: Vec<String>,
    pub model: String,
    pub language: String,
    /// Store clock time when `None`
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl NewCard {
    pub fn new(
        topic: impl Into<String>,
        summary: impl Into<String>,
        subtopics: Vec<String>,
        model: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            summary: summary.into(),
            subtopics,
            model: model.into(),
            language: language.into(),
            timestamp: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_params(mut self, temperature: f64, max_tokens: u32) -> Self {
        self.temperature = Some(temperature);
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Encode subtopics for the `subtopics` column.
///
/// JSON keeps order, leaves non-ASCII text as-is, and escapes anything that
/// could look like a separator, so every list round-trips exactly.
pub fn encode_subtopics(subtopics: &[String]) -> serde_json::Result<String> {
    serde_json::to_string(subtopics)
}

pub fn decode_subtopics(raw: &str) -> serde_json::Result<Vec<String>> {
    serde_json::from_str(raw)
}

/// Fixed-width UTC form with nanoseconds, so text order in SQLite is
/// chronological order and no precision is lost
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and SQLite's `CURRENT_TIMESTAMP` form
/// (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
