//! Sync session configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

/// Sync session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSessionConfig {
    /// End-of-stream detection
    #[serde(default)]
    pub end_of_stream: EndOfStreamPolicy,

    /// Accelerometer / gyroscope pairing
    #[serde(default)]
    pub pairing: PairingConfig,

    /// Playback pacing
    #[serde(default)]
    pub pacing: PacingMode,
}

/// How the frame clock decides the video has ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfStreamPolicy {
    /// Stop on the first timestamp lower than its predecessor
    #[default]
    TimestampRegression,
    /// Stop after the source's reported frame count
    FrameCount,
}

/// Accelerometer / gyroscope pairing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Pairing mode
    #[serde(default)]
    pub mode: PairingMode,

    /// Maximum timestamp disagreement between paired samples (milliseconds)
    #[serde(default = "default_tolerance_ms")]
    pub tolerance_ms: f64,
}

fn default_tolerance_ms() -> f64 {
    2.5
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            mode: PairingMode::default(),
            tolerance_ms: default_tolerance_ms(),
        }
    }
}

impl PairingConfig {
    /// Tolerance in seconds
    pub fn tolerance_s(&self) -> f64 {
        self.tolerance_ms * 1e-3
    }
}

/// Strategy for pairing accelerometer and gyroscope samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMode {
    /// Equal counts and matching timestamps, paired by position
    Strict,
    /// Each accelerometer sample takes the nearest gyroscope sample
    Nearest,
    /// Strict, falling back to Nearest
    #[default]
    Auto,
}

/// Playback pacing strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// Sleep out the remainder of each frame interval
    #[default]
    RealTime,
    /// Process frames as fast as possible
    None,
}
