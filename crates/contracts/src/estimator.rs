//! Estimator trait - visual-inertial estimator boundary
//!
//! The estimator itself is external. This trait is the only surface the
//! sync loop relies on.

use std::path::Path;

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

use crate::{ContractError, ImageData, InertialSample};

/// Visual-inertial estimator boundary
pub trait Estimator {
    /// Estimator name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Track one frame
    ///
    /// `imu` holds every inertial sample since the previous frame, in
    /// timestamp order, possibly empty.
    ///
    /// # Errors
    /// Returns estimator error (should include context)
    fn track(
        &mut self,
        image: &ImageData,
        timestamp: f64,
        imu: &[InertialSample],
    ) -> Result<TrackingResult, ContractError>;

    /// Stop all estimator work
    fn shutdown(&mut self) -> Result<(), ContractError>;

    /// Export the estimated trajectory
    fn save_trajectory(&self, path: &Path) -> Result<(), ContractError>;
}

/// Per-frame estimator result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    /// Frame sequence number, counted by the estimator
    pub frame_index: u64,

    /// Frame timestamp (seconds)
    pub timestamp: f64,

    /// Tracking state
    pub state: TrackingState,

    /// Camera pose in the world frame, when tracking
    pub pose: Option<Isometry3<f64>>,

    /// Inertial samples supplied with the frame
    pub imu_samples: usize,
}

impl TrackingResult {
    pub fn is_lost(&self) -> bool {
        self.state == TrackingState::Lost
    }
}

/// Estimator tracking state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    #[default]
    NotInitialized,
    Ok,
    Lost,
}

impl TrackingState {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingState::NotInitialized => "not_initialized",
            TrackingState::Ok => "ok",
            TrackingState::Lost => "lost",
        }
    }
}
