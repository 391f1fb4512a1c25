//! Cache command handler
//!
//! Maintenance for the durable cache table. The in-memory store lives only
//! inside a running server, so there is nothing to maintain for it here.

use crate::cache::file::FileStore;
use crate::cache::StoreBackend;
use crate::config::Config;
use crate::error::{Error, Result};
use clap::{Args, Subcommand};

/// Cache command arguments
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands
#[derive(Subcommand)]
pub enum CacheCommand {
    /// Show the table file path
    Path,
    /// Remove expired records
    Purge,
    /// Delete every record
    Clear,
}

/// Run the cache command
pub async fn run(args: CacheArgs) -> Result<()> {
    let config = Config::load_effective()?;
    let store = durable_store(&config)?;

    match args.command {
        CacheCommand::Path => {
            println!("{}", store.path().display());
        }
        CacheCommand::Purge => {
            let removed = store.purge_expired().await?;
            println!("Removed {} expired record(s)", removed);
        }
        CacheCommand::Clear => {
            store.clear().await?;
            println!("Cache table cleared");
        }
    }

    Ok(())
}

/// Open the configured durable table
fn durable_store(config: &Config) -> Result<FileStore> {
    match StoreBackend::from_config(&config.cache)? {
        StoreBackend::File(store) => Ok(store),
        StoreBackend::Memory(_) => Err(Error::Config(format!(
            "The '{}' cache backend has no durable table (set cache.backend = \"file\")",
            config.cache.backend
        ))),
    }
}
