//! Cache command - manage rendered bundles

use crate::cache::{format_age, format_bytes, BundleCache, CacheEntry};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::DrctlResult;
use crate::process::ProcessRunner;
use chrono::Utc;
use console::style;
use std::sync::Arc;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> DrctlResult<()> {
    let cache = BundleCache::from_config(config, Arc::new(ProcessRunner::new()));

    match args.action {
        CacheAction::Get { dir, key } => {
            let path = cache.get(&dir, &key).await?;
            println!("{}", path.display());
        }
        CacheAction::Refresh { dir, key } => {
            cache.refresh(&dir, &key).await?;
        }
        CacheAction::Clear { key } => {
            cache.clear(key.as_deref()).await?;
            match key {
                Some(key) => println!("{} Cleared {}", style("✓").green(), style(key).cyan()),
                None => println!(
                    "{} Cleared {}",
                    style("✓").green(),
                    cache.root().display()
                ),
            }
        }
        CacheAction::List { format } => {
            let entries = cache.list().await?;
            match format {
                OutputFormat::Table => print_table(&entries),
                OutputFormat::Plain => print_plain(&entries),
            }
        }
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    if entries.is_empty() {
        println!("No cached bundles.");
        return;
    }

    let now = Utc::now();
    println!("{:<48} {:>10} {:>6}  {:<20}", "KEY", "SIZE", "AGE", "BUILT");
    println!("{}", "-".repeat(88));

    for entry in entries {
        println!(
            "{:<48} {:>10} {:>6}  {:<20}",
            entry.key,
            format_bytes(entry.size),
            format_age(entry.age(now)),
            entry.modified.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("Total: {} bundle(s)", entries.len());
}

fn print_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.key);
    }
}
