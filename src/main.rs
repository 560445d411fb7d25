//! Pokedex CLI - explore the Pokemon world from your terminal
//!
//! An interactive REPL that pages through PokeAPI location areas, explores
//! them, and lets you catch and inspect pokemon. API responses are cached in
//! memory for a short TTL.

use std::io;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use pokedex::cache::ResponseCache;
use pokedex::cli::{Cli, StartupConfig};
use pokedex::commands::CommandRegistry;
use pokedex::data::{CachedFetcher, PokeApiClient};
use pokedex::repl;
use pokedex::session::Session;

/// Sets up `tracing` output on stderr, honouring `RUST_LOG` when set
fn init_logging(config: &StartupConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate into a startup configuration
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    info!(ttl = ?config.cache_ttl, base_url = %config.base_url, "starting pokedex");

    let cache = Arc::new(ResponseCache::new(config.cache_ttl));
    let client = PokeApiClient::new(CachedFetcher::new(Arc::clone(&cache)))
        .with_base_url(config.base_url.as_str())
        .with_page_size(config.page_size);
    let mut session = match config.seed {
        Some(seed) => Session::with_seed(client, seed),
        None => Session::new(client),
    };
    let registry = CommandRegistry::builtin();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    repl::run(&registry, &mut session, stdin, &mut stdout).await?;

    cache.close();
    Ok(())
}
