//! CLI module - Command definitions and handlers
//!
//! A thin shell over the card store and the generator: every handler opens
//! the store, does one thing, prints the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod clear;
pub mod config;
pub mod delete;
pub mod generate;
pub mod init;
pub mod list;
pub mod search;
pub mod show;
pub mod stats;
pub mod utils;

/// edcards - Educational cards generated by LLMs
///
/// Type a topic, get a summary and three related subtopics, keep them for later.
#[derive(Parser, Debug)]
#[command(name = "edcards")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "EDCARDS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (EDCARDS_DATABASE takes precedence)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new edcards directory
    Init(init::InitArgs),

    /// Generate a card for a topic and save it
    Generate(generate::GenerateArgs),

    /// List saved cards, newest first
    List(list::ListArgs),

    /// Search cards by topic or summary
    Search(search::SearchArgs),

    /// Show a card by ID
    Show(show::ShowArgs),

    /// Delete a card by ID
    Delete(delete::DeleteArgs),

    /// Delete every card
    Clear(clear::ClearArgs),

    /// Show card statistics
    Stats(stats::StatsArgs),

    /// Get or set configuration
    Config(config::ConfigArgs),
}

impl Cli {
    pub fn globals(&self) -> utils::GlobalOpts {
        utils::GlobalOpts {
            config: self.config.clone(),
            db: self.db.clone(),
        }
    }
}
