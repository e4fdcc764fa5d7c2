//! `edcards delete` command

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use super::utils::GlobalOpts;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Card ID
    pub id: i64,
}

pub fn run(args: DeleteArgs, globals: &GlobalOpts) -> Result<()> {
    let (_config, store) = globals.open_store()?;

    if !store.delete(args.id)? {
        bail!("Card not found: {}", args.id);
    }

    println!("{} Deleted card #{}", "✓".green(), args.id);
    Ok(())
}
