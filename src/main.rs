//! edcards CLI - Entry point
//!
//! Usage: edcards <command> [options]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edcards::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "edcards=debug" } else { "edcards=warn" })
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let globals = cli.globals();

    match cli.command {
        Commands::Init(args) => edcards::cli::init::run(args),
        Commands::Generate(args) => edcards::cli::generate::run(args, &globals),
        Commands::List(args) => edcards::cli::list::run(args, &globals),
        Commands::Search(args) => edcards::cli::search::run(args, &globals),
        Commands::Show(args) => edcards::cli::show::run(args, &globals),
        Commands::Delete(args) => edcards::cli::delete::run(args, &globals),
        Commands::Clear(args) => edcards::cli::clear::run(args, &globals),
        Commands::Stats(args) => edcards::cli::stats::execute(args, &globals),
        Commands::Config(args) => edcards::cli::config::run(args, &globals),
    }
}
