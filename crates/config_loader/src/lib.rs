//! # Config Loader
//!
//! Settings loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON settings files
//! - Validate settings legality
//! - Generate `SettingsBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let settings = ConfigLoader::load_from_path(Path::new("settings.toml")).unwrap();
//! println!("Resolution: {:?}", settings.working_resolution());
//! ```

mod parser;
mod validator;

pub use contracts::SettingsBlueprint;
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
    /// - File read failure (`SettingsUnreadable`)
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SettingsBlueprint, ContractError> {
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
    ) -> Result<SettingsBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already constructed blueprint (e.g. after CLI overrides)
    pub fn validate(blueprint: &SettingsBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize SettingsBlueprint to TOML string
    pub fn to_toml(blueprint: &SettingsBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::settings_unreadable(format!("TOML serialize error: {e}")))
    }

    /// Serialize SettingsBlueprint to JSON string
    pub fn to_json(blueprint: &SettingsBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::settings_unreadable(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer settings format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::settings_unreadable("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::settings_unreadable(format!("unsupported settings format: .{ext}"))
        })
    }

    /// Read settings file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        std::fs::read_to_string(path).map_err(|e| ContractError::SettingsUnreadable {
            message: format!("cannot read '{}': {e}", path.display()),
            source: Some(Box::new(e)),
        })
    }

    /// Parse and validate settings content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SettingsBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
