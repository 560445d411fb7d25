//! Command-line interface parsing for the Pokedex CLI
//!
//! This module handles parsing of CLI arguments using clap and validates them
//! into a `StartupConfig` before the cache and REPL are built.

use clap::Parser;
use std::time::Duration;
use thiserror::Error;

use crate::data::{DEFAULT_PAGE_SIZE, POKEAPI_BASE_URL};

/// Default time an API response stays cached, in milliseconds
pub const DEFAULT_CACHE_TTL_MS: u64 = 5_000;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The cache TTL must be a positive duration
    #[error("Invalid cache TTL: {0} ms. The TTL must be greater than zero")]
    InvalidCacheTtl(u64),

    /// Pages must hold at least one location area
    #[error("Invalid page size: {0}. The page size must be greater than zero")]
    InvalidPageSize(u32),
}

/// Pokedex CLI - explore the Pokemon world from your terminal
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Interactive Pokedex backed by PokeAPI")]
#[command(version)]
pub struct Cli {
    /// How long API responses stay cached, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_CACHE_TTL_MS)]
    pub cache_ttl_ms: u64,

    /// Root URL of the PokeAPI
    #[arg(long, value_name = "URL", default_value = POKEAPI_BASE_URL)]
    pub base_url: String,

    /// Number of location areas per `map` page
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Seed for catch rolls, for reproducible sessions
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Log cache and network activity to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Cache TTL, also the reaper interval
    pub cache_ttl: Duration,
    pub base_url: String,
    pub page_size: u32,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            base_url: POKEAPI_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            seed: None,
            verbose: false,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the TTL or page size is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.cache_ttl_ms == 0 {
            return Err(CliError::InvalidCacheTtl(cli.cache_ttl_ms));
        }
        if cli.page_size == 0 {
            return Err(CliError::InvalidPageSize(cli.page_size));
        }

        Ok(StartupConfig {
            cache_ttl: Duration::from_millis(cli.cache_ttl_ms),
            base_url: cli.base_url.clone(),
            page_size: cli.page_size,
            seed: cli.seed,
            verbose: cli.verbose,
        })
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "warn,pokedex=debug"
        } else {
            "warn"
        }
    }
}
