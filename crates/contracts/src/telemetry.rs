//! Telemetry streams - TelemetryParser output
//!
//! Time-sorted, timestamp-deduplicated sample streams extracted from a
//! camera telemetry document.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Named sample stream, sorted by timestamp
///
/// Built from samples in document order. A later sample at an identical
/// timestamp replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStream<V> {
    name: String,
    samples: Vec<(f64, V)>,
}

impl<V> TelemetryStream<V> {
    /// Build a stream from samples in insertion order
    pub fn from_samples(name: impl Into<String>, samples: impl IntoIterator<Item = (f64, V)>) -> Self {
        let mut samples: Vec<(f64, V)> = samples.into_iter().collect();
        // Stable: equal timestamps keep insertion order, so the last one wins below.
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut deduped: Vec<(f64, V)> = Vec::with_capacity(samples.len());
        for (t, v) in samples {
            match deduped.last_mut() {
                Some(last) if last.0 == t => last.1 = v,
                _ => deduped.push((t, v)),
            }
        }

        Self {
            name: name.into(),
            samples: deduped,
        }
    }

    /// Create an empty stream
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    /// Stream name (e.g. `ACCL`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sorted `(timestamp, value)` pairs
    pub fn samples(&self) -> &[(f64, V)] {
        &self.samples
    }

    /// Sorted timestamps
    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|(t, _)| *t)
    }

    /// Earliest timestamp
    pub fn first_timestamp(&self) -> Option<f64> {
        self.samples.first().map(|(t, _)| *t)
    }

    /// Latest timestamp
    pub fn last_timestamp(&self) -> Option<f64> {
        self.samples.last().map(|(t, _)| *t)
    }

    /// Re-express every timestamp relative to `origin`
    pub fn shifted(self, origin: f64) -> Self {
        Self {
            name: self.name,
            samples: self
                .samples
                .into_iter()
                .map(|(t, v)| (t - origin, v))
                .collect(),
        }
    }

    /// Count, duration and mean rate of the stream
    pub fn summary(&self) -> StreamSummary {
        StreamSummary::from_timestamps(&self.name, self.timestamps())
    }
}

/// Inertial telemetry extracted from one device of a telemetry document
#[derive(Debug, Clone)]
pub struct ImuTelemetry {
    /// Device key in the document (e.g. `"1"`)
    pub device: String,

    /// Accelerometer stream, zero-based on its first sample
    pub accel: TelemetryStream<Vector3<f64>>,

    /// Gyroscope stream, raw seconds (not zero-based)
    pub gyro: TelemetryStream<Vector3<f64>>,

    /// Raw timestamp (seconds) of the first accelerometer sample
    pub time_origin: f64,

    /// Orientation (`CORI`) timestamps, raw seconds, document order
    pub orientation_timestamps: Vec<f64>,

    /// GPS (`GPS5`) timestamps, raw seconds, document order
    pub gps_timestamps: Vec<f64>,

    /// Frame rate reported by the document, if any
    pub reported_fps: Option<f64>,
}

impl ImuTelemetry {
    /// Summaries for every extracted stream
    pub fn summary(&self) -> TelemetrySummary {
        TelemetrySummary {
            device: self.device.clone(),
            time_origin: self.time_origin,
            reported_fps: self.reported_fps,
            streams: vec![
                self.accel.summary(),
                self.gyro.summary(),
                StreamSummary::from_timestamps("CORI", self.orientation_timestamps.iter().copied()),
                StreamSummary::from_timestamps("GPS5", self.gps_timestamps.iter().copied()),
            ],
        }
    }
}

/// Per-stream diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub name: String,
    pub samples: usize,
    pub first: Option<f64>,
    pub last: Option<f64>,
    /// Mean sample rate (Hz), None with fewer than two samples
    pub rate_hz: Option<f64>,
}

impl StreamSummary {
    /// Summarize a timestamp sequence (seconds)
    pub fn from_timestamps(name: &str, timestamps: impl Iterator<Item = f64>) -> Self {
        let mut samples = 0usize;
        let mut first: Option<f64> = None;
        let mut last: Option<f64> = None;
        for t in timestamps {
            samples += 1;
            first = Some(first.map_or(t, |f| f.min(t)));
            last = Some(last.map_or(t, |l| l.max(t)));
        }

        let rate_hz = match (first, last) {
            (Some(f), Some(l)) if samples > 1 && l > f => Some((samples - 1) as f64 / (l - f)),
            _ => None,
        };

        Self {
            name: name.to_string(),
            samples,
            first,
            last,
            rate_hz,
        }
    }

    /// Covered time span (seconds)
    pub fn duration(&self) -> f64 {
        match (self.first, self.last) {
            (Some(f), Some(l)) => l - f,
            _ => 0.0,
        }
    }
}

/// Telemetry diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySummary {
    pub device: String,
    pub time_origin: f64,
    pub reported_fps: Option<f64>,
    pub streams: Vec<StreamSummary>,
}
