//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Settings file not found
    #[error("Settings file not found: {path}")]
    SettingsNotFound { path: String },

    /// Input file or directory not found
    #[error("{what} not found: {path}")]
    InputNotFound { what: &'static str, path: String },
}

impl CliError {
    pub fn settings_not_found(path: impl Into<String>) -> Self {
        Self::SettingsNotFound { path: path.into() }
    }

    pub fn input_not_found(what: &'static str, path: impl Into<String>) -> Self {
        Self::InputNotFound {
            what,
            path: path.into(),
        }
    }
}
