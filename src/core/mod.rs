//! Core module - Cards and their persistence
//!
//! Contains the card model, the SQLite card store and the subtopic normalizer.

pub mod card;
pub mod clock;
pub mod error;
pub mod normalize;
pub mod store;
