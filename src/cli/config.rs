//! `edcards config` command
//!
//! Get or set configuration values.
//!
//! # Usage
//! ```bash
//! edcards config                              # Show config file
//! edcards config generator.default_language   # Get value
//! edcards config generator.default_language pt
//! edcards config --path                       # Show config locations
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use toml_edit::{DocumentMut, Item, Value};

use super::utils::GlobalOpts;
use crate::config::{Config, APP_DIR, CONFIG_FILE};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config key (e.g., generator.default_model, normalizer.min_chars)
    pub key: Option<String>,

    /// Value to set
    pub value: Option<String>,

    /// List all config values
    #[arg(long)]
    pub list: bool,

    /// Edit config file in $EDITOR
    #[arg(short, long)]
    pub edit: bool,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Use global config (~/.edcards/config.toml) instead of local
    #[arg(short, long)]
    pub global: bool,
}

fn config_path(args: &ConfigArgs, globals: &GlobalOpts) -> PathBuf {
    if let Some(explicit) = &globals.config {
        return explicit.clone();
    }
    if args.global {
        return Config::global_config_path()
            .unwrap_or_else(|| Path::new(APP_DIR).join(CONFIG_FILE));
    }
    Config::find_local_config().unwrap_or_else(|| Path::new(APP_DIR).join(CONFIG_FILE))
}

pub fn run(args: ConfigArgs, globals: &GlobalOpts) -> Result<()> {
    let config_path = config_path(&args, globals);

    if args.path {
        if let Some(global) = Config::global_config_path() {
            println!("Global: {}", global.display());
        }
        println!("Local:  {}", Path::new(APP_DIR).join(CONFIG_FILE).display());
        println!();
        if config_path.exists() {
            println!("✓ Active: {}", config_path.display());
        } else {
            println!("⚠ No config file found at {}", config_path.display());
        }
        return Ok(());
    }

    if args.edit {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
            println!("Created {}", config_path.display());
        }

        std::process::Command::new(&editor)
            .arg(&config_path)
            .status()
            .with_context(|| format!("Failed to open editor: {}", editor))?;
        return Ok(());
    }

    if args.list || args.key.is_none() {
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            println!("📋 Configuration ({}):\n", config_path.display());
            println!("{}", content);
        } else {
            println!("📋 No config file at {}", config_path.display());
            println!();
            println!("Create one with:");
            println!("  edcards init");
            println!("  edcards config generator.default_language pt");
        }
        return Ok(());
    }

    if let Some(key) = &args.key {
        if let Some(value) = &args.value {
            set_config_value(&config_path, key, value)?;
            println!("✅ Set {} = {} (in {})", key, value, config_path.display());
        } else {
            match get_config_value(&config_path, key)? {
                Some(v) => println!("{}", v),
                None => println!("(not set)"),
            }
        }
    }

    Ok(())
}

/// Set a nested config value using dot notation (e.g., "store.default_limit")
fn set_config_value(path: &Path, key: &str, val: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content.parse().context("Failed to parse config.toml")?;

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        [name] => doc[*name] = Item::Value(parse_toml_value(val)),
        [section, name] => {
            if doc.get(section).is_none() {
                doc[*section] = toml_edit::table();
            }
            doc[*section][*name] = Item::Value(parse_toml_value(val));
        }
        _ => bail!("Key too deep: {}. Max depth is section.key", key),
    }

    // Refuse to write something the loader would reject
    toml::from_str::<Config>(&doc.to_string())
        .with_context(|| format!("Invalid value for {}: {}", key, val))?;

    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Get a config value by dot notation key
fn get_config_value(path: &Path, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content).context("Failed to parse config.toml")?;
    let doc = toml::Value::Table(table);

    let val = key
        .split('.')
        .try_fold(&doc, |node, part| node.get(part));

    Ok(val.map(|v| match v {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

/// Parse string value to the matching TOML type
fn parse_toml_value(s: &str) -> Value {
    if let Ok(b) = s.parse::<bool>() {
        return Value::from(b);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::from(f);
    }
    Value::from(s)
}
