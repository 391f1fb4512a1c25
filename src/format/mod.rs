//! Output formatters
//!
//! Provides trait-based output formatting for resolution results.

pub mod json;
pub mod text;

use crate::error::Result;
use crate::resolve::Resolution;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a resolution result
    fn format(&self, resolution: &Resolution) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    let formatters: [&dyn OutputFormatter; 2] = [&json::JsonFormatter, &text::TextFormatter];
    formatters
        .into_iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_resolution() -> Resolution {
    use crate::coord::Coordinates;
    use crate::resolve::Source;

    Resolution {
        address: "New York, NY".to_string(),
        source: Source::Live,
        coordinates: Coordinates::new(40.7128, -74.006),
        timestamp: chrono::DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&chrono::Utc),
    }
}
