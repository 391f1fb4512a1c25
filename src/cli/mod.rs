//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod cache;
pub mod config;
pub mod resolve;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Cached reverse geocoding for coordinates and IP addresses
#[derive(Parser)]
#[command(name = "where-am-i")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Resolve coordinates or an IP address to an address
    Resolve(resolve::ResolveArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Maintain the durable cache table
    Cache(cache::CacheArgs),

    /// Show server status
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Cache(args) => cache::run(args).await,
        Commands::Status(args) => status::run(args).await,
    }
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over `default_level`. Logs go to stderr so command output
/// on stdout stays machine-readable.
pub(crate) fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
