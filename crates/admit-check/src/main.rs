//! admit-check - Run cache admission decisions from the command line
//!
//! Plays the host cache manager: loads the decision plugin, configures it
//! with a blacklist file and prints a verdict for every URL.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use tracing::{info, info_span, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod check;
mod config;

use admit_core::get_decision;
use admit_storage::LocalStorage;
use check::check;
use config::Config;

/// admit-check - Decide whether URLs would be admitted to the cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Blacklist file (overrides the configuration file)
    #[arg(short, long, env = "ADMIT_BLACKLIST")]
    blacklist: Option<String>,

    /// Local cache directory (overrides the configuration file)
    #[arg(short, long, env = "ADMIT_STORAGE")]
    storage: Option<String>,

    /// Print only the verdict for each URL
    #[arg(short, long)]
    quiet: bool,

    /// URLs to check; read from stdin, one per line, when omitted
    urls: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting admit-check v{}", env!("CARGO_PKG_VERSION"));

    let blacklist = args.blacklist.unwrap_or(config.decision.blacklist);
    let storage_path = args.storage.unwrap_or(config.storage.path);

    let storage = LocalStorage::new(&storage_path)
        .with_context(|| format!("Failed to open storage at {}", storage_path))?;

    let mut decision = get_decision(info_span!("decision", plugin = "blacklist"));
    if !decision.configure(&blacklist) {
        warn!("Blacklist not configured, every object will be cached");
    }

    let urls: Vec<String> = if args.urls.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("Failed to read URLs from stdin")?
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    } else {
        args.urls
    };

    let mut stdout = std::io::stdout().lock();
    for url in &urls {
        let verdict = check(decision.as_ref(), &storage, url);
        if args.quiet {
            writeln!(stdout, "{}", verdict.action())?;
        } else {
            writeln!(stdout, "{}", verdict)?;
        }
    }

    info!("Checked {} URLs", urls.len());
    Ok(())
}

/// Initialize logging
///
/// Diagnostics go to stderr so that stdout only carries verdicts.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
