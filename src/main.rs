//! where-am-i CLI entry point
//!
//! Cached reverse geocoding - CLI + web app

use where_am_i::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
