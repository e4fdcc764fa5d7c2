//! edcards - Educational cards generated by LLMs
//!
//! A topic goes in; a short summary and up to three related subtopics come
//! out, and the result is kept in a local SQLite card store.
//!
//! ## Key Concepts
//!
//! - **Card**: one stored generation result (topic, summary, subtopics, model params)
//! - **Normalizer**: turns a free-form model reply into a short list of subtopics
//! - **Generator**: prompt templates per language plus a chat-completion client
//! - **Pipeline**: summary, subtopics, save; nothing is stored unless every step succeeds

pub mod cli;
pub mod config;
pub mod core;
pub mod generator;

pub use core::card::{Card, NewCard};
pub use core::clock::{Clock, SystemClock};
pub use core::error::StoreError;
pub use core::normalize::{normalize, Normalizer};
pub use core::store::{CardStats, CardStore};
pub use generator::pipeline::{generate_card, CardRequest, PipelineError, Stage};
pub use generator::{ChatModel, ClientCache, ContentGenerator, GenerationError, HfChatClient};
