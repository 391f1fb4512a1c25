//! Status command handler
//!
//! Shows the effective cache setup and whether a server is answering.

use crate::config::Config;
use crate::error::Result;
use crate::server::routes::HealthResponse;
use clap::Args;
use std::time::Duration;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Server address to probe (defaults to the configured host:port)
    #[arg(long)]
    pub addr: Option<String>,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load_effective()?;
    let addr = args.addr.unwrap_or_else(|| config.server_addr());

    println!("where-am-i v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!(
        "Cache: {} (ttl {} days, precision {})",
        config.cache.backend, config.cache.ttl_days, config.cache.precision
    );
    if let Some(table) = &config.cache.table {
        println!("  Table: {}", table);
    }
    println!();

    check_server_status(&addr).await;
    Ok(())
}

/// Check if the server is running
async fn check_server_status(addr: &str) {
    let url = format!("http://{}/api/health", addr);
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            println!("Server: UNKNOWN ({})", e);
            return;
        }
    };

    match client.get(&url).send().await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", addr);
                if let Ok(health) = response.json::<HealthResponse>().await {
                    println!("  Version: {}", health.version);
                    println!("  Uptime:  {}s", health.uptime_secs);
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", addr);
        }
    }
}
