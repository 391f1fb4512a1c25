//! Config command handler
//!
//! View and modify configuration settings.

use crate::cache::available_stores;
use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "cache.ttl_days")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            print!("{}", render_config(&config));
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.validate()?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Render all configuration values in TOML-like form
fn render_config(config: &Config) -> String {
    let stores: Vec<String> = available_stores().into_iter().map(|s| s.name).collect();
    let mut out = String::new();

    out.push_str("[server]\n");
    out.push_str(&format!("host = \"{}\"\n", config.server.host));
    out.push_str(&format!("port = {}\n", config.server.port));
    out.push('\n');

    out.push_str("[cache]\n");
    out.push_str(&format!(
        "backend = \"{}\" # {}\n",
        config.cache.backend,
        stores.join(" | ")
    ));
    match &config.cache.table {
        Some(table) => out.push_str(&format!("table = \"{}\"\n", table)),
        None => out.push_str("table = \"\" # not configured\n"),
    }
    out.push_str(&format!("ttl_days = {}\n", config.cache.ttl_days));
    out.push_str(&format!("precision = {}\n", config.cache.precision));
    out.push_str(&format!("max_entries = {}\n", config.cache.max_entries));
    out.push_str(&format!(
        "empty_address_is_hit = {}\n",
        config.cache.empty_address_is_hit
    ));
    out.push_str(&format!("strict_writes = {}\n", config.cache.strict_writes));
    out.push('\n');

    out.push_str("[upstream]\n");
    out.push_str(&format!("nominatim_url = \"{}\"\n", config.upstream.nominatim_url));
    out.push_str(&format!("ip_api_url = \"{}\"\n", config.upstream.ip_api_url));
    out.push_str(&format!("user_agent = \"{}\"\n", config.upstream.user_agent));
    out.push_str(&format!("timeout_secs = {}\n", config.upstream.timeout_secs));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_sections() {
        let rendered = render_config(&Config::default());

        assert!(rendered.contains("[server]\n"));
        assert!(rendered.contains("port = 8787\n"));
        assert!(rendered.contains("backend = \"memory\" # memory | file\n"));
        assert!(rendered.contains("table = \"\" # not configured\n"));
        assert!(rendered.contains("[upstream]\n"));
    }

    #[test]
    fn test_render_config_table() {
        let mut config = Config::default();
        config.cache.table = Some("geocache".to_string());

        assert!(render_config(&config).contains("table = \"geocache\"\n"));
    }
}
