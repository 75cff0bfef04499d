//! RecordingEstimator - stand-in estimator that records every call

use std::path::Path;

use contracts::{ContractError, Estimator, ImageData, InertialSample, TrackingResult, TrackingState};
use tracing::{debug, info, instrument};

use crate::error::EstimatorError;
use crate::trajectory::write_trajectory;

/// Estimator that never produces a pose
///
/// Every frame is recorded as `NotInitialized` together with the number of
/// inertial samples it received, so the trajectory export documents exactly
/// what the sync loop delivered.
#[derive(Debug, Default)]
pub struct RecordingEstimator {
    results: Vec<TrackingResult>,
    samples_seen: u64,
    last_sample_timestamp: Option<f64>,
    shut_down: bool,
}

impl RecordingEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results recorded so far, in call order
    pub fn results(&self) -> &[TrackingResult] {
        &self.results
    }

    pub fn frames_tracked(&self) -> u64 {
        self.results.len() as u64
    }

    /// Total inertial samples received over all frames
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Timestamp of the most recent inertial sample received
    pub fn last_sample_timestamp(&self) -> Option<f64> {
        self.last_sample_timestamp
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Estimator for RecordingEstimator {
    fn name(&self) -> &str {
        "recording"
    }

    fn track(
        &mut self,
        image: &ImageData,
        timestamp: f64,
        imu: &[InertialSample],
    ) -> Result<TrackingResult, ContractError> {
        if self.shut_down {
            return Err(EstimatorError::shut_down(self.name()).into());
        }

        let result = TrackingResult {
            frame_index: self.results.len() as u64,
            timestamp,
            state: TrackingState::NotInitialized,
            pose: None,
            imu_samples: imu.len(),
        };

        self.samples_seen += imu.len() as u64;
        if let Some(last) = imu.last() {
            self.last_sample_timestamp = Some(last.timestamp);
        }

        debug!(
            frame = result.frame_index,
            timestamp,
            width = image.width,
            height = image.height,
            imu_samples = imu.len(),
            "frame recorded"
        );
        self.results.push(result.clone());
        Ok(result)
    }

    #[instrument(name = "recording_estimator_shutdown", skip(self))]
    fn shutdown(&mut self) -> Result<(), ContractError> {
        if !self.shut_down {
            self.shut_down = true;
            info!(
                frames = self.results.len(),
                samples = self.samples_seen,
                "estimator shut down"
            );
        }
        Ok(())
    }

    #[instrument(name = "recording_estimator_save", skip(self), fields(path = %path.display()))]
    fn save_trajectory(&self, path: &Path) -> Result<(), ContractError> {
        write_trajectory(path, &self.results)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ImageFormat, Vector3};

    fn samples(ts: &[f64]) -> Vec<InertialSample> {
        ts.iter()
            .map(|&t| InertialSample::new(t, Vector3::zeros(), Vector3::zeros()))
            .collect()
    }

    #[test]
    fn records_every_frame() {
        let mut estimator = RecordingEstimator::new();
        let image = ImageData::blank(2, 2, ImageFormat::Gray8);

        let first = estimator.track(&image, 0.0, &[]).unwrap();
        let second = estimator.track(&image, 0.033, &samples(&[0.01, 0.02])).unwrap();

        assert_eq!(first.frame_index, 0);
        assert_eq!(first.imu_samples, 0);
        assert_eq!(second.frame_index, 1);
        assert_eq!(second.imu_samples, 2);
        assert_eq!(second.state, TrackingState::NotInitialized);
        assert!(second.pose.is_none());
        assert_eq!(estimator.frames_tracked(), 2);
        assert_eq!(estimator.samples_seen(), 2);
        assert_eq!(estimator.last_sample_timestamp(), Some(0.02));
    }

    #[test]
    fn track_after_shutdown_fails() {
        let mut estimator = RecordingEstimator::new();
        estimator.shutdown().unwrap();
        estimator.shutdown().unwrap();
        assert!(estimator.is_shut_down());

        let image = ImageData::blank(1, 1, ImageFormat::Gray8);
        let err = estimator.track(&image, 0.0, &[]).unwrap_err();
        assert!(matches!(err, ContractError::Estimator { .. }));
    }

    #[test]
    fn save_trajectory_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.csv");

        let mut estimator = RecordingEstimator::new();
        let image = ImageData::blank(1, 1, ImageFormat::Gray8);
        estimator.track(&image, 0.5, &samples(&[0.4])).unwrap();
        estimator.shutdown().unwrap();
        estimator.save_trajectory(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().nth(1).unwrap().starts_with("0,0.500000,not_initialized,0,1"));
    }

    #[test]
    fn save_failure_maps_to_trajectory_export() {
        let dir = tempfile::tempdir().unwrap();
        let estimator = RecordingEstimator::new();
        let err = estimator.save_trajectory(dir.path()).unwrap_err();
        assert!(matches!(err, ContractError::TrajectoryExport { .. }));
    }
}
