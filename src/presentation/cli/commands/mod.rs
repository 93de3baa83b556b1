pub mod bulk;
pub mod init;
pub mod list;
pub mod validate_config;

use anyhow::Result;
use serde::Serialize;

use super::OutputFormat;

/// Serialize `value` for the machine-readable formats; `None` for text
pub fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Text => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}
