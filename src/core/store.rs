//! Card store - SQLite backend
//!
//! Single-file SQLite database with one `cards` table.
//!
//! # Key Points
//! - Every operation opens its own connection and drops it on return
//! - Writes run in `BEGIN IMMEDIATE` transactions (WAL, 5s busy timeout)
//! - `AUTOINCREMENT` ids: never reused, even after `clear_all`
//! - Search is a case-insensitive literal substring match on topic/summary
//! - Ordering and the recent window compare `ts_key(timestamp)`, which puts
//!   SQLite `CURRENT_TIMESTAMP` rows into the same text form as ours
//! - Statistics never fail; errors degrade to zeroed counts

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::card::{
    decode_subtopics, encode_subtopics, format_timestamp, parse_timestamp, Card, NewCard,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use super::clock::{Clock, SystemClock};
use super::error::{Result, StoreError};

/// Limit used when a caller passes a non-positive one
pub const DEFAULT_LIMIT: i64 = 50;

/// Width of the "recent cards" window, inclusive
pub const RECENT_WINDOW_DAYS: i64 = 7;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS cards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        topic TEXT NOT NULL,
        summary TEXT NOT NULL,
        subtopics TEXT NOT NULL,  -- JSON array
        model TEXT NOT NULL,
        language TEXT NOT NULL,
        timestamp TEXT NOT NULL,  -- RFC 3339, UTC, nanoseconds
        temperature REAL,
        max_tokens INTEGER
    );

    CREATE INDEX IF NOT EXISTS idx_cards_timestamp ON cards(timestamp DESC);

    CREATE INDEX IF NOT EXISTS idx_cards_topic ON cards(topic);
"#;

const SELECT_CARDS: &str = "SELECT id, topic, summary, subtopics, model, language, timestamp, temperature, max_tokens FROM cards";

/// Aggregate counts for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardStats {
    pub total_count: u64,
    pub count_by_model: BTreeMap<String, u64>,
    pub count_by_language: BTreeMap<String, u64>,
    /// Cards stamped within the last [`RECENT_WINDOW_DAYS`] days
    pub recent_count: u64,
}

/// Durable card repository.
///
/// Holds only the database path and a clock; cloning is cheap and every
/// clone talks to the same file.
#[derive(Clone)]
pub struct CardStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardStore").field("path", &self.path).finish()
    }
}

impl CardStore {
    /// Create a handle without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a handle and make sure the schema exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    /// Replace the clock used for default timestamps and the recent window
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the table and indexes if missing. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)
            .map_err(|source| self.unavailable(source))?;

        info!(path = %self.path.display(), "card store initialized");
        Ok(())
    }

    /// Insert a new card and return its id
    pub fn save(&self, card: &NewCard) -> Result<i64> {
        if card.topic.trim().is_empty() {
            return Err(StoreError::InvalidCard("topic must not be empty"));
        }
        if card.summary.trim().is_empty() {
            return Err(StoreError::InvalidCard("summary must not be empty"));
        }

        let subtopics = encode_subtopics(&card.subtopics)?;
        let timestamp = card.timestamp.unwrap_or_else(|| self.clock.now());

        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::Write)?;

        tx.execute(
            r#"
            INSERT INTO cards (
                topic, summary, subtopics, model, language,
                timestamp, temperature, max_tokens
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                card.topic,
                card.summary,
                subtopics,
                card.model,
                card.language,
                format_timestamp(&timestamp),
                card.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                card.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            ],
        )
        .map_err(StoreError::Write)?;

        let id = tx.last_insert_rowid();
        tx.commit().map_err(StoreError::Write)?;

        info!(card_id = id, topic = %card.topic, model = %card.model, "card saved");
        Ok(id)
    }

    /// Newest cards first, at most `limit` of them
    pub fn get_all(&self, limit: i64) -> Result<Vec<Card>> {
        let limit = effective_limit(limit);
        let conn = self.connect()?;

        let cards = query_cards(
            &conn,
            &format!("{SELECT_CARDS} ORDER BY ts_key(timestamp) DESC, id DESC LIMIT ?1"),
            params![limit],
        )?;

        debug!(count = cards.len(), "listed cards");
        Ok(cards)
    }

    /// Cards whose topic or summary contains `query`, newest first.
    ///
    /// Matching ignores case (Unicode lowercase on both sides) and treats
    /// every character literally, so `%` and `_` match themselves. An empty
    /// query matches everything.
    pub fn search(&self, query: &str, limit: i64) -> Result<Vec<Card>> {
        if query.is_empty() {
            return self.get_all(limit);
        }

        let limit = effective_limit(limit);
        let conn = self.connect()?;

        let cards = query_cards(
            &conn,
            &format!(
                "{SELECT_CARDS}
                 WHERE instr(fold(topic), fold(?1)) > 0
                    OR instr(fold(summary), fold(?1)) > 0
                 ORDER BY ts_key(timestamp) DESC, id DESC
                 LIMIT ?2"
            ),
            params![query, limit],
        )?;

        debug!(query, count = cards.len(), "searched cards");
        Ok(cards)
    }

    /// Get a single card by id
    pub fn get(&self, id: i64) -> Result<Option<Card>> {
        let conn = self.connect()?;

        let row = conn
            .query_row(
                &format!("{SELECT_CARDS} WHERE id = ?1"),
                [id],
                CardRow::from_row,
            )
            .optional()
            .map_err(StoreError::Read)?;

        row.map(CardRow::into_card).transpose()
    }

    /// Delete one card. Returns `false` when no card had that id.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::Write)?;

        let removed = tx
            .execute("DELETE FROM cards WHERE id = ?1", [id])
            .map_err(StoreError::Write)?;
        tx.commit().map_err(StoreError::Write)?;

        if removed > 0 {
            info!(card_id = id, "card deleted");
        } else {
            warn!(card_id = id, "card not found");
        }
        Ok(removed > 0)
    }

    /// Number of stored cards
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
            .map_err(StoreError::Read)?;
        Ok(total as u64)
    }

    /// Delete every card. Ids already handed out stay retired.
    pub fn clear_all(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::Write)?;

        let removed = tx
            .execute("DELETE FROM cards", [])
            .map_err(StoreError::Write)?;
        tx.commit().map_err(StoreError::Write)?;

        info!(removed, "all cards cleared");
        Ok(())
    }

    /// Dashboard counts. Any failure yields zeroed stats.
    pub fn get_statistics(&self) -> CardStats {
        match self.try_statistics() {
            Ok(stats) => {
                debug!(total = stats.total_count, recent = stats.recent_count, "statistics read");
                stats
            }
            Err(e) => {
                error!(error = %e, path = %self.path.display(), "failed to read statistics");
                CardStats::default()
            }
        }
    }

    fn try_statistics(&self) -> Result<CardStats> {
        let mut conn = self.connect()?;
        // One read transaction so the four counts agree with each other
        let tx = conn.transaction().map_err(StoreError::Read)?;

        let total: i64 = tx
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
            .map_err(StoreError::Read)?;

        let count_by_model = grouped_counts(&tx, "model")?;
        let count_by_language = grouped_counts(&tx, "language")?;

        let cutoff = self.clock.now() - chrono::Duration::days(RECENT_WINDOW_DAYS);
        let recent: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM cards WHERE ts_key(timestamp) >= ?1",
                [format_timestamp(&cutoff)],
                |row| row.get(0),
            )
            .map_err(StoreError::Read)?;

        Ok(CardStats {
            total_count: total as u64,
            count_by_model,
            count_by_language,
            recent_count: recent as u64,
        })
    }

    /// Open a connection for the duration of one operation
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| self.unavailable(source))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|source| self.unavailable(source))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|source| self.unavailable(source))?;

        // SQLite's lower() only folds ASCII
        conn.create_scalar_function(
            "fold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )
        .map_err(|source| self.unavailable(source))?;

        // Canonical text for any timestamp we can parse, the raw text otherwise
        conn.create_scalar_function(
            "ts_key",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let raw: Option<String> = ctx.get(0)?;
                Ok(raw.map(|raw| match parse_timestamp(&raw) {
                    Some(ts) => format_timestamp(&ts),
                    None => raw,
                }))
            },
        )
        .map_err(|source| self.unavailable(source))?;

        Ok(conn)
    }

    fn unavailable(&self, source: rusqlite::Error) -> StoreError {
        StoreError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

fn effective_limit(limit: i64) -> i64 {
    if limit > 0 {
        limit
    } else {
        DEFAULT_LIMIT
    }
}

fn query_cards<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(sql).map_err(StoreError::Read)?;

    let rows = stmt
        .query_map(params, CardRow::from_row)
        .map_err(StoreError::Read)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(StoreError::Read)?;

    rows.into_iter().map(CardRow::into_card).collect()
}

/// `column` is always one of our own literals, never user input
fn grouped_counts(conn: &Connection, column: &'static str) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {column}, COUNT(*) FROM cards GROUP BY {column}"
        ))
        .map_err(StoreError::Read)?;

    let counts = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })
        .map_err(StoreError::Read)?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()
        .map_err(StoreError::Read)?;

    Ok(counts)
}

/// Raw column values, decoded into a [`Card`] outside the row callback
struct CardRow {
    id: i64,
    topic: String,
    summary: String,
    subtopics: String,
    model: String,
    language: String,
    timestamp: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl CardRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            topic: row.get(1)?,
            summary: row.get(2)?,
            subtopics: row.get(3)?,
            model: row.get(4)?,
            language: row.get(5)?,
            timestamp: row.get(6)?,
            temperature: row.get(7)?,
            max_tokens: row.get(8)?,
        })
    }

    fn into_card(self) -> Result<Card> {
        let subtopics = decode_subtopics(&self.subtopics).map_err(|e| StoreError::Corrupt {
            id: self.id,
            reason: format!("subtopics: {e}"),
        })?;
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| StoreError::Corrupt {
            id: self.id,
            reason: format!("timestamp: {:?}", self.timestamp),
        })?;

        Ok(Card {
            id: self.id,
            topic: self.topic,
            summary: self.summary,
            subtopics,
            model: self.model,
            language: self.language,
            timestamp,
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}
