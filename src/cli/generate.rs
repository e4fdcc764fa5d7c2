//! `edcards generate` command
//!
//! Asks the model for a summary and three subtopics, then saves the card.
//!
//! # Usage
//! ```bash
//! edcards generate "Transfer Learning"
//! edcards generate "Redes Neurais" --lang pt
//! edcards generate "GANs" --temperature 0.7 --max-tokens 1024
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::utils::{print_card, GlobalOpts, OutputFormat};
use crate::config::TOKEN_ENV;
use crate::generator::pipeline::{generate_card, CardRequest, Stage};
use crate::generator::{ChatModel, ClientCache, HfChatClient};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Topic to explore
    pub topic: String,

    /// Language code for the prompt (default: generator.default_language)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Model name (default: generator.default_model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature, 0.0-1.0
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Max new tokens, 100-2048
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// API token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

pub fn run(args: GenerateArgs, globals: &GlobalOpts) -> Result<()> {
    let (config, store) = globals.open_store()?;

    let language = args
        .lang
        .unwrap_or_else(|| config.generator.default_language.clone());
    let model = args
        .model
        .unwrap_or_else(|| config.generator.default_model.clone());
    let params = config
        .model_catalog()
        .params(&model, args.temperature, args.max_tokens)?;

    let generator = config.content_generator();
    if !generator.prompts().supports(&language) {
        eprintln!(
            "{} No prompts for language '{}', using '{}'",
            "!".yellow(),
            language,
            config.generator.default_language
        );
    }

    // A missing token surfaces as an auth error from the first client build
    let token = config.api_token(args.token.as_deref()).unwrap_or_default();
    let base_url = config.generator.base_url.clone();
    let timeout_secs = config.generator.timeout_secs;
    let clients = ClientCache::new(
        Duration::from_secs(config.generator.client_ttl_secs),
        move |params| {
            let client = HfChatClient::new(&base_url, &token, params.clone(), timeout_secs)?;
            Ok(Arc::new(client) as Arc<dyn ChatModel>)
        },
    );

    let request = CardRequest {
        topic: args.topic.clone(),
        language,
        params,
    };

    eprintln!("🤖 Processing with {}...", model.cyan());
    let result = generate_card(&store, &generator, &clients, &request, |stage| {
        let label = match stage {
            Stage::Summary => "Generating summary",
            Stage::Subtopics => "Generating subtopics",
            Stage::Saving => "Saving card",
            Stage::Done => "Done",
        };
        eprintln!("   {} {}", format!("[{:>3}%]", stage.percent()).dimmed(), label);
    });

    match result {
        Ok(card) => {
            eprintln!("{} Card generated using {}\n", "✓".green(), model);
            print_card(&card, args.format)
        }
        Err(e) if e.is_auth() => {
            eprintln!(
                "{} Authorization failed. Check your API token ({} or generator.api_token).",
                "✗".red(),
                TOKEN_ENV
            );
            Err(e.into())
        }
        Err(e) => {
            eprintln!("{} Generation failed for '{}'", "✗".red(), args.topic);
            eprintln!("   Run with --verbose for details.");
            Err(e.into())
        }
    }
}
