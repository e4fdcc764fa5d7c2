//! `edcards search` command
//!
//! Case-insensitive substring search over topic and summary.
//!
//! # Usage
//! ```bash
//! edcards search "neural"
//! edcards search "100%" --format json
//! ```

use anyhow::Result;
use clap::Args;

use super::utils::{print_cards, GlobalOpts, OutputFormat};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for (empty matches everything)
    pub query: String,

    /// Maximum results (default: store.default_limit)
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

pub fn run(args: SearchArgs, globals: &GlobalOpts) -> Result<()> {
    let (config, store) = globals.open_store()?;

    let cards = store.search(
        args.query.trim(),
        args.limit.unwrap_or(config.store.default_limit),
    )?;
    print_cards(&cards, args.format)
}
