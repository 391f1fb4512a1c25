//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::resolve::Resolution;

/// Text formatter - outputs a short human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, resolution: &Resolution) -> Result<String> {
        let address = if resolution.address.is_empty() {
            "(no address)"
        } else {
            resolution.address.as_str()
        };

        let mut output = String::new();
        output.push_str(&format!("{}\n", address));
        output.push_str(&format!(
            "Coordinates: ({:.6}, {:.6})\n",
            resolution.coordinates.lat, resolution.coordinates.lon
        ));
        output.push_str(&format!("Source: {}\n", resolution.source));
        output.push_str(&format!("Resolved at: {}\n", resolution.timestamp.to_rfc3339()));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_resolution;

    #[test]
    fn test_text_format() {
        let output = TextFormatter.format(&sample_resolution()).unwrap();

        assert!(output.starts_with("New York, NY\n"));
        assert!(output.contains("Coordinates: (40.712800, -74.006000)"));
        assert!(output.contains("Source: live"));
    }

    #[test]
    fn test_text_format_empty_address() {
        let mut resolution = sample_resolution();
        resolution.address.clear();

        let output = TextFormatter.format(&resolution).unwrap();
        assert!(output.starts_with("(no address)"));
    }
}
