//! Playback pacing
//!
//! After each estimator call the pacer may sleep out the rest of the frame
//! interval. Pacing never changes which samples a frame receives.

use std::time::Duration;

use contracts::PacingMode;
use tracing::{info, warn};

/// Pacing strategy
pub trait Pacer: Send {
    /// Name (used for logging)
    fn name(&self) -> &'static str;

    /// Called once per frame with the time spent processing it
    fn pace(&mut self, processing: Duration);
}

/// Process frames as fast as possible
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn name(&self) -> &'static str {
        "none"
    }

    fn pace(&mut self, _processing: Duration) {}
}

/// Sleep for `frame_interval - processing` when positive
#[derive(Debug, Clone, Copy)]
pub struct RealTimePacing {
    frame_interval: Duration,
}

impl RealTimePacing {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }

    /// Pacing at the given frame rate, if it is usable
    pub fn from_fps(fps: f64) -> Option<Self> {
        if fps.is_finite() && fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps).ok().map(Self::new)
        } else {
            None
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Time left in the frame interval
    pub fn remaining(&self, processing: Duration) -> Option<Duration> {
        self.frame_interval
            .checked_sub(processing)
            .filter(|d| !d.is_zero())
    }
}

impl Pacer for RealTimePacing {
    fn name(&self) -> &'static str {
        "real_time"
    }

    fn pace(&mut self, processing: Duration) {
        if let Some(wait) = self.remaining(processing) {
            std::thread::sleep(wait);
        }
    }
}

/// Build the pacer for `mode` at the source's frame rate
///
/// Real-time pacing without a usable frame rate degrades to no pacing.
pub fn pacer_for(mode: PacingMode, fps: Option<f64>) -> Box<dyn Pacer> {
    match mode {
        PacingMode::None => Box::new(NoPacing),
        PacingMode::RealTime => match fps.and_then(RealTimePacing::from_fps) {
            Some(pacer) => {
                info!(interval_ms = pacer.frame_interval().as_secs_f64() * 1e3, "real-time pacing");
                Box::new(pacer)
            }
            None => {
                warn!(fps = ?fps, "no usable frame rate, pacing disabled");
                Box::new(NoPacing)
            }
        },
    }
}
