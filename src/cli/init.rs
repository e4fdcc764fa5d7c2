//! `edcards init` command
//!
//! Creates an `.edcards/` directory with a default config and an empty
//! card store.
//!
//! # Usage
//! ```bash
//! edcards init                    # Initialize in current directory
//! edcards init /path/to/project   # Initialize in specific path
//! edcards init --global           # Initialize ~/.edcards
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::config::{Config, APP_DIR, CONFIG_FILE, DB_FILE};
use crate::core::store::CardStore;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Initialize ~/.edcards instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite an existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let app_dir = if args.global {
        Config::global_dir().ok_or_else(|| anyhow!("Could not locate home directory"))?
    } else {
        args.path.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
    };

    let config_path = app_dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to reinitialize.",
            config_path.display()
        );
    }

    println!("🚀 Initializing edcards in: {}", app_dir.display());

    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    Config::default().save_to(&config_path)?;

    // Existing cards are kept; initialize only adds what is missing
    let db_path = app_dir.join(DB_FILE);
    CardStore::open(&db_path)?;

    println!("\n✅ Initialized edcards");
    println!("   Config: {}", config_path.display());
    println!("   Database: {}", db_path.display());
    println!("\nNext steps:");
    println!("  export HUGGINGFACEHUB_API_TOKEN=hf_...");
    println!("  edcards generate \"Convolutional Neural Networks\"");
    println!("  edcards list");

    Ok(())
}
