//! Layered error definitions
//!
//! Categorized by source: settings / telemetry / video / sync / estimator

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Settings Errors =====
    /// Settings file missing or unparseable
    #[error("settings unreadable: {message}")]
    SettingsUnreadable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Settings validation error
    #[error("settings validation error at '{field}': {message}")]
    SettingsValidation { field: String, message: String },

    // ===== Telemetry Errors =====
    /// Telemetry document missing, unparseable or lacking required streams
    #[error("telemetry unavailable ({origin}): {reason}")]
    TelemetryUnavailable { origin: String, reason: String },

    // ===== Video Errors =====
    /// Video source cannot be opened
    #[error("video unopenable '{path}': {message}")]
    VideoUnopenable { path: String, message: String },

    /// A single frame could not be decoded
    #[error("frame {index} decode error: {message}")]
    FrameDecode { index: u64, message: String },

    /// Occlusion mask image could not be loaded
    #[error("mask unreadable '{path}': {message}")]
    MaskUnreadable { path: String, message: String },

    // ===== Sync Errors =====
    /// Accelerometer and gyroscope streams cannot be paired
    #[error("stream misalignment: accel={accel} gyro={gyro}: {reason}")]
    StreamMisalignment {
        accel: usize,
        gyro: usize,
        reason: String,
    },

    // ===== Estimator Errors =====
    /// Estimator call failed
    #[error("estimator '{estimator}' error: {message}")]
    Estimator { estimator: String, message: String },

    /// Trajectory export failed
    #[error("trajectory export to '{path}' failed: {message}")]
    TrajectoryExport { path: String, message: String },

    // ===== General Errors =====
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create settings unreadable error
    pub fn settings_unreadable(message: impl Into<String>) -> Self {
        Self::SettingsUnreadable {
            message: message.into(),
            source: None,
        }
    }

    /// Create settings validation error
    pub fn settings_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SettingsValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create telemetry unavailable error
    pub fn telemetry_unavailable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TelemetryUnavailable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create video unopenable error
    pub fn video_unopenable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VideoUnopenable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create stream misalignment error
    pub fn stream_misalignment(accel: usize, gyro: usize, reason: impl Into<String>) -> Self {
        Self::StreamMisalignment {
            accel,
            gyro,
            reason: reason.into(),
        }
    }

    /// Create estimator error
    pub fn estimator(estimator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Estimator {
            estimator: estimator.into(),
            message: message.into(),
        }
    }

    /// Whether the run may continue without inertial data
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::TelemetryUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_unavailable_is_degradable() {
        let err = ContractError::telemetry_unavailable("gopro.json", "missing ACCL stream");
        assert!(err.is_degradable());
        assert!(err.to_string().contains("missing ACCL stream"));
    }

    #[test]
    fn misalignment_is_fatal() {
        let err = ContractError::stream_misalignment(10, 9, "sample counts differ");
        assert!(!err.is_degradable());
        assert_eq!(
            err.to_string(),
            "stream misalignment: accel=10 gyro=9: sample counts differ"
        );
    }
}
