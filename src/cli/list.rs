//! `edcards list` command
//!
//! # Usage
//! ```bash
//! edcards list
//! edcards list --limit 5 --format table
//! ```

use anyhow::Result;
use clap::Args;

use super::utils::{print_cards, GlobalOpts, OutputFormat};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum cards (default: store.default_limit)
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

pub fn run(args: ListArgs, globals: &GlobalOpts) -> Result<()> {
    let (config, store) = globals.open_store()?;

    let cards = store.get_all(args.limit.unwrap_or(config.store.default_limit))?;
    print_cards(&cards, args.format)
}
