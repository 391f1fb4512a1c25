//! Resolve command handler
//!
//! Resolves a single position through the configured cache and providers.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::resolve::{DefaultResolver, ResolveRequest};
use clap::Args;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<String>,

    /// Longitude
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<String>,

    /// IP address to locate (used when no coordinates are given)
    #[arg(long)]
    pub ip: Option<String>,

    /// Output format
    #[arg(long, short = 'f', default_value = "json")]
    pub format: String,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

impl From<&ResolveArgs> for ResolveRequest {
    fn from(args: &ResolveArgs) -> Self {
        ResolveRequest {
            lat: args.lat.clone(),
            lon: args.lon.clone(),
            ip: args.ip.clone(),
        }
    }
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> Result<()> {
    if args.list_formats {
        for format in available_formats() {
            println!("  {:<6} {}", format.name, format.description);
        }
        return Ok(());
    }

    super::init_tracing("warn");

    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown output format: {}", args.format)))?;

    let config = Config::load_effective()?;
    let resolver = DefaultResolver::from_config(&config)?;

    let resolution = resolver.resolve(&ResolveRequest::from(&args)).await?;
    print!("{}", formatter.format(&resolution)?);
    if !args.format.eq_ignore_ascii_case("text") {
        println!();
    }

    Ok(())
}
