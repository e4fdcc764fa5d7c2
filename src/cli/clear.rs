//! `edcards clear` command
//!
//! Deletes every card after a confirmation prompt.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;

use super::utils::GlobalOpts;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn run(args: ClearArgs, globals: &GlobalOpts) -> Result<()> {
    let (_config, store) = globals.open_store()?;

    let total = store.count()?;
    if total == 0 {
        println!("✨ No cards to clear.");
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all {} card(s)? This cannot be undone", total))
            .default(false)
            .interact()
            .context("Confirmation needs a terminal; pass --yes to skip it")?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.clear_all()?;
    println!("{} Cleared {} card(s).", "✓".green(), total);
    Ok(())
}
