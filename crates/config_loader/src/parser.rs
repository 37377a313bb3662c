//! Settings parsing module
//!
//! TOML is the primary settings format; JSON is accepted for tooling that
//! generates configs programmatically.

use contracts::{ContractError, RelaySettings};

/// Settings file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// Parse settings in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RelaySettings, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(format, e)),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(format, e)),
    }
}

fn parse_error(
    format: ConfigFormat,
    error: impl std::error::Error + Send + Sync + 'static,
) -> ContractError {
    ContractError::ConfigParse {
        message: format!("{} parse error: {}", format.label(), error),
        source: Some(Box::new(error)),
    }
}
