//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GripperRegion, SettingsBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    settings_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SettingsSummary>,
}

#[derive(Serialize)]
struct SettingsSummary {
    version: String,
    resolution: String,
    fps: Option<f64>,
    end_of_stream: String,
    pacing: String,
    pairing: String,
    masking: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(settings = %args.settings.display(), "Validating settings");

    let result = validate_settings(args);

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
        anyhow::bail!("Settings validation failed")
    }
}

fn validate_settings(args: &ValidateArgs) -> ValidationResult {
    let settings_path = args.settings.display().to_string();

    // Check file exists
    if !args.settings.exists() {
        return ValidationResult {
            valid: false,
            settings_path,
            error: Some(format!("File not found: {}", args.settings.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.settings) {
        Ok(settings) => {
            let warnings = collect_warnings(&settings);
            ValidationResult {
                valid: true,
                settings_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(SettingsSummary {
                    version: format!("{:?}", settings.version),
                    resolution: format!("{}x{}", settings.camera.width, settings.camera.height),
                    fps: settings.camera.fps,
                    end_of_stream: format!("{:?}", settings.sync.end_of_stream),
                    pacing: format!("{:?}", settings.sync.pacing),
                    pairing: format!("{:?}", settings.sync.pairing.mode),
                    masking: settings.mask.is_active(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            settings_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect settings warnings (non-fatal issues)
fn collect_warnings(settings: &SettingsBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if settings.camera.fps.is_none() {
        warnings.push(format!(
            "camera.fps is not set - frame rate comes from telemetry or defaults to {} fps",
            ingestion::DEFAULT_SEQUENCE_FPS
        ));
    }

    if let Some(path) = &settings.mask.image_path {
        if !path.exists() {
            warnings.push(format!("mask.image_path '{}' does not exist", path.display()));
        }
    } else if settings.mask.gripper == GripperRegion::Carve {
        warnings.push("mask.gripper = carve has no effect without mask.image_path".to_string());
    }

    if settings.report.interval_frames == 0 {
        warnings.push("report.interval_frames = 0 - periodic timing reports disabled".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Settings are valid: {}", result.settings_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Resolution: {}", summary.resolution);
            match summary.fps {
                Some(fps) => println!("  Frame rate: {}", fps),
                None => println!("  Frame rate: (unset)"),
            }
            println!("  End of stream: {}", summary.end_of_stream);
            println!("  Pacing: {}", summary.pacing);
            println!("  Pairing: {}", summary.pairing);
            println!("  Masking: {}", summary.masking);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Settings are invalid: {}", result.settings_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
