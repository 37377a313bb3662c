//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{sink_target, RelaySettings};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    disconnected_timeout_secs: u64,
    log_enabled: bool,
    ibi_enabled: bool,
    bpm_enabled: bool,
    udp_enabled: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(settings) => {
            let warnings = collect_warnings(&settings);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    disconnected_timeout_secs: settings.source.disconnected_timeout_secs,
                    log_enabled: sink_target(&settings.log.file).is_some(),
                    ibi_enabled: sink_target(&settings.ibi.file).is_some(),
                    bpm_enabled: sink_target(&settings.bpm.file).is_some(),
                    udp_enabled: settings.udp.is_valid(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(settings: &RelaySettings) -> Vec<String> {
    let mut warnings = Vec::new();

    let any_sink = sink_target(&settings.log.file).is_some()
        || sink_target(&settings.ibi.file).is_some()
        || sink_target(&settings.bpm.file).is_some()
        || settings.udp.is_valid();
    if !any_sink {
        warnings.push("No sinks configured - readings will be discarded".to_string());
    }

    if sink_target(&settings.log.file).is_some()
        && !settings.log.format.eq_ignore_ascii_case("csv")
    {
        warnings.push(format!(
            "log.format \"{}\" is not \"csv\" - the log sink will produce no rows",
            settings.log.format
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!(
                "\n  Disconnect timeout: {}s",
                summary.disconnected_timeout_secs
            );
            println!("  Log sink: {}", enabled_label(summary.log_enabled));
            println!("  IBI sink: {}", enabled_label(summary.ibi_enabled));
            println!("  BPM sink: {}", enabled_label(summary.bpm_enabled));
            println!("  UDP sink: {}", enabled_label(summary.udp_enabled));
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
