//! # Config Loader
//!
//! Settings loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON settings files
//! - Validate settings legality
//! - Generate `RelaySettings`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let settings = ConfigLoader::load_from_path(Path::new("pulselink.toml")).unwrap();
//! println!("Timeout: {}s", settings.source.disconnected_timeout_secs);
//! ```

mod parser;
mod validator;

pub use contracts::RelaySettings;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Settings loader
///
/// Provides static methods to load settings from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RelaySettings, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load settings from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RelaySettings, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize RelaySettings to TOML string
    pub fn to_toml(settings: &RelaySettings) -> Result<String, ContractError> {
        toml::to_string_pretty(settings)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RelaySettings to JSON string
    pub fn to_json(settings: &RelaySettings) -> Result<String, ContractError> {
        serde_json::to_string_pretty(settings)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer settings format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read settings file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate settings content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RelaySettings, ContractError> {
        let settings = parser::parse(content, format)?;
        validator::validate(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[source]
disconnected_timeout_secs = 15

[log]
file = "hr-%date%.csv"
format = "csv"
date_format = "OA"

[udp]
hostname = "127.0.0.1"
port = 5050
"#;

    #[test]
    fn loads_minimal_toml() {
        let settings = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(settings.source.disconnected_timeout_secs, 15);
        assert_eq!(settings.log.file, "hr-%date%.csv");
        assert_eq!(settings.log.date_format, "OA");
        assert_eq!(settings.udp.endpoint(), Some("127.0.0.1:5050".to_string()));
        // Omitted sections fall back to defaults.
        assert!(settings.ibi.file.is_empty());
        assert!(settings.bpm.file.is_empty());
    }

    #[test]
    fn loads_empty_settings_with_defaults() {
        let settings = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(settings.source.disconnected_timeout_secs, 10);
        assert_eq!(settings.log.format, "csv");
    }

    #[test]
    fn loads_json() {
        let settings = ConfigLoader::load_from_str(
            r#"{ "bpm": { "file": "bpm.txt" } }"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(settings.bpm.file, "bpm.txt");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = ConfigLoader::load_from_path(Path::new("settings.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn round_trips_through_toml() {
        let settings = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let rendered = ConfigLoader::to_toml(&settings).unwrap();
        let reparsed = ConfigLoader::load_from_str(&rendered, ConfigFormat::Toml).unwrap();
        assert_eq!(reparsed.log.file, settings.log.file);
        assert_eq!(reparsed.udp.port, settings.udp.port);
    }
}
