//! Inertial timeline
//!
//! Immutable, time-ordered sequence of paired inertial samples built once
//! at startup and only read afterwards.

use contracts::{ContractError, ImuTelemetry, InertialSample, PairingConfig, Vector3};
use tracing::{info, instrument};

use crate::pairing::pair_streams;

/// Time-ordered inertial samples, zero-based on the first accelerometer sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InertialTimeline {
    samples: Vec<InertialSample>,
}

impl InertialTimeline {
    /// Timeline with no samples (vision-only operation)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from parallel sequences
    ///
    /// # Errors
    /// `StreamMisalignment` when lengths differ or timestamps decrease
    pub fn from_parts(
        timestamps: &[f64],
        accel: &[Vector3<f64>],
        gyro: &[Vector3<f64>],
    ) -> Result<Self, ContractError> {
        if timestamps.len() != accel.len() || accel.len() != gyro.len() {
            return Err(ContractError::stream_misalignment(
                accel.len(),
                gyro.len(),
                format!(
                    "parallel sequences differ in length (timestamps={})",
                    timestamps.len()
                ),
            ));
        }

        let samples = timestamps
            .iter()
            .zip(accel)
            .zip(gyro)
            .map(|((&t, &a), &g)| InertialSample::new(t, a, g))
            .collect();

        Self::from_samples(samples)
    }

    /// Build from already paired samples
    ///
    /// # Errors
    /// `StreamMisalignment` when timestamps decrease or are not finite
    pub fn from_samples(samples: Vec<InertialSample>) -> Result<Self, ContractError> {
        if let Some(i) = samples.iter().position(|s| !s.timestamp.is_finite()) {
            return Err(ContractError::stream_misalignment(
                samples.len(),
                samples.len(),
                format!("non-finite timestamp at index {i}"),
            ));
        }
        if let Some(i) = samples
            .windows(2)
            .position(|w| w[1].timestamp < w[0].timestamp)
        {
            return Err(ContractError::stream_misalignment(
                samples.len(),
                samples.len(),
                format!("timestamps decrease at index {}", i + 1),
            ));
        }

        Ok(Self { samples })
    }

    /// Pair the accelerometer and gyroscope streams of parsed telemetry
    #[instrument(name = "timeline_from_telemetry", skip_all, fields(device = %telemetry.device))]
    pub fn from_telemetry(
        telemetry: &ImuTelemetry,
        pairing: &PairingConfig,
    ) -> Result<Self, ContractError> {
        let timeline = Self::from_samples(pair_streams(telemetry, pairing)?)?;
        info!(
            samples = timeline.len(),
            duration_s = timeline.duration(),
            "inertial timeline built"
        );
        Ok(timeline)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of sample `i`
    pub fn timestamp(&self, i: usize) -> Option<f64> {
        self.samples.get(i).map(|s| s.timestamp)
    }

    /// Sample `i`
    pub fn sample(&self, i: usize) -> Option<&InertialSample> {
        self.samples.get(i)
    }

    /// All samples
    pub fn samples(&self) -> &[InertialSample] {
        &self.samples
    }

    /// Time covered by the timeline (seconds)
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }
}
