//! Store errors
//!
//! Every failure the card store can report. Statistics never surface these;
//! all other operations return them to the caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The database file cannot be opened or its schema created.
    #[error("card store unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The directory holding the database cannot be created.
    #[error("cannot create store directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write card: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("failed to read cards: {0}")]
    Read(#[source] rusqlite::Error),

    /// A stored row could not be decoded back into a card.
    #[error("card {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("failed to encode subtopics: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid card: {0}")]
    InvalidCard(&'static str),
}

impl StoreError {
    /// Whether the backing medium itself is unusable (as opposed to a single
    /// operation failing).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Directory { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
