//! CLI utility functions
//!
//! Common helpers shared across commands:
//! - Config and store resolution from global flags
//! - Card rendering (pretty, table, JSON)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Config;
use crate::core::card::Card;
use crate::core::store::CardStore;

/// Flags that apply to every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
}

impl GlobalOpts {
    /// Explicit --config file, or the usual discovery
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    pub fn db_path(&self, config: &Config) -> PathBuf {
        config.db_path(self.db.as_deref())
    }

    /// Load config and open (initializing if needed) the card store
    pub fn open_store(&self) -> Result<(Config, CardStore)> {
        let config = self.load_config()?;
        let path = self.db_path(&config);
        let store = CardStore::open(&path)
            .with_context(|| format!("Cannot open card store at {}", path.display()))?;
        Ok((config, store))
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Full cards, colored
    #[default]
    Pretty,
    /// One row per card
    Table,
    /// JSON array / object
    Json,
}

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Lang")]
    language: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Created (UTC)")]
    created: String,
}

impl From<&Card> for CardRow {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            topic: card.topic.clone(),
            language: card.language.clone(),
            model: card.model.clone(),
            created: card.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub fn print_cards(cards: &[Card], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(cards)?);
        }
        OutputFormat::Table => {
            if cards.is_empty() {
                println!("No cards found.");
            } else {
                let rows: Vec<CardRow> = cards.iter().map(CardRow::from).collect();
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
        OutputFormat::Pretty => {
            if cards.is_empty() {
                println!("No cards found.");
                return Ok(());
            }
            println!("\n📚 {} card(s):\n", cards.len());
            for card in cards {
                print_pretty(card);
            }
        }
    }
    Ok(())
}

pub fn print_card(card: &Card, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(card)?),
        OutputFormat::Table => print_cards(std::slice::from_ref(card), format)?,
        OutputFormat::Pretty => print_pretty(card),
    }
    Ok(())
}

fn print_pretty(card: &Card) {
    println!(
        "{} {}",
        format!("#{}", card.id).dimmed(),
        card.topic.cyan().bold()
    );
    println!(
        "   {}",
        format!(
            "{} · {} · temp {:.2} · {} tokens · {}",
            card.language,
            card.model,
            card.temperature,
            card.max_tokens,
            card.timestamp.format("%Y-%m-%d %H:%M UTC")
        )
        .dimmed()
    );
    println!();
    for line in card.summary.lines() {
        println!("   {}", line);
    }
    if !card.subtopics.is_empty() {
        println!("\n   {}", "Related subtopics".bold());
        for (i, subtopic) in card.subtopics.iter().enumerate() {
            println!("   {}. {}", i + 1, subtopic);
        }
    }
    println!();
}
