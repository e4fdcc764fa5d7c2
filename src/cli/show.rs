//! `edcards show` command

use anyhow::{bail, Result};
use clap::Args;

use super::utils::{print_card, GlobalOpts, OutputFormat};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Card ID
    pub id: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

pub fn run(args: ShowArgs, globals: &GlobalOpts) -> Result<()> {
    let (_config, store) = globals.open_store()?;

    match store.get(args.id)? {
        Some(card) => print_card(&card, args.format),
        None => bail!("Card not found: {}", args.id),
    }
}
