//! Stats command - Show card statistics

use std::collections::BTreeMap;

use clap::Args;

use super::utils::GlobalOpts;
use crate::core::store::RECENT_WINDOW_DAYS;

/// Stats command arguments
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute stats command
pub fn execute(args: StatsArgs, globals: &GlobalOpts) -> anyhow::Result<()> {
    let (_config, store) = globals.open_store()?;

    let stats = store.get_statistics();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("📊 Card Statistics\n");
    println!("  Total cards:      {}", stats.total_count);
    println!(
        "  Recent ({} days):  {}",
        RECENT_WINDOW_DAYS, stats.recent_count
    );

    print_breakdown("🤖 By model", &stats.count_by_model, stats.total_count);
    print_breakdown("🌐 By language", &stats.count_by_language, stats.total_count);

    println!("\n📁 Database: {}", store.path().display());
    Ok(())
}

fn print_breakdown(title: &str, counts: &BTreeMap<String, u64>, total: u64) {
    if counts.is_empty() {
        return;
    }

    println!("\n{}:", title);
    let last = counts.len() - 1;
    for (i, (name, count)) in counts.iter().enumerate() {
        let branch = if i == last { "└──" } else { "├──" };
        println!(
            "  {} {}: {} ({}%)",
            branch,
            name,
            count,
            if total > 0 { count * 100 / total } else { 0 }
        );
    }
}
