//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::resolve::Resolution;

/// JSON formatter - outputs the response envelope as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Response envelope as JSON"
    }

    fn format(&self, resolution: &Resolution) -> Result<String> {
        Ok(serde_json::to_string_pretty(resolution)?)
    }
}
