//! Frame clock
//!
//! Converts the video source's playback position into frame timestamps
//! (seconds) and detects the end of the stream.
//!
//! Some decoders report position 0 for reads past the last frame, so the
//! default policy treats any timestamp strictly lower than its predecessor
//! as the end of the video. Repeated equal timestamps are not an end.

use contracts::{EndOfStreamPolicy, EndReason};
use tracing::{debug, warn};

/// 毫秒 → 秒
pub const MS_TO_S: f64 = 1e-3;

/// Previous-timestamp value before the first frame
pub const SENTINEL_TIMESTAMP: f64 = -100.0;

/// Outcome of feeding one playback position to the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockTick {
    /// A new frame
    Frame {
        /// Zero-based frame index
        index: u64,
        /// Frame timestamp (seconds)
        timestamp: f64,
    },
    /// The video has ended
    EndOfStream(EndReason),
}

/// Frame timestamp source with end-of-stream detection
#[derive(Debug, Clone)]
pub struct FrameClock {
    policy: EndOfStreamPolicy,
    expected_frames: Option<u64>,
    previous: f64,
    next_index: u64,
    regressions: u64,
    ended: Option<EndReason>,
}

impl FrameClock {
    /// Create a clock
    ///
    /// `FrameCount` without a reported total falls back to
    /// `TimestampRegression`.
    pub fn new(policy: EndOfStreamPolicy, expected_frames: Option<u64>) -> Self {
        let policy = match (policy, expected_frames) {
            (EndOfStreamPolicy::FrameCount, None) => {
                warn!("source reports no frame count, using timestamp regression");
                EndOfStreamPolicy::TimestampRegression
            }
            (policy, _) => policy,
        };

        Self {
            policy,
            expected_frames,
            previous: SENTINEL_TIMESTAMP,
            next_index: 0,
            regressions: 0,
            ended: None,
        }
    }

    /// Policy actually in effect
    pub fn policy(&self) -> EndOfStreamPolicy {
        self.policy
    }

    /// Timestamp of the last emitted frame (sentinel before the first)
    pub fn previous_timestamp(&self) -> f64 {
        self.previous
    }

    /// Frames emitted so far
    pub fn frames_emitted(&self) -> u64 {
        self.next_index
    }

    /// Backwards steps observed
    pub fn regressions(&self) -> u64 {
        self.regressions
    }

    /// Termination cause, once ended
    pub fn end_reason(&self) -> Option<EndReason> {
        self.ended
    }

    /// Feed the playback position (milliseconds) of the frame just read
    pub fn tick(&mut self, position_ms: f64) -> ClockTick {
        if let Some(reason) = self.ended {
            return ClockTick::EndOfStream(reason);
        }

        if self.policy == EndOfStreamPolicy::FrameCount
            && self
                .expected_frames
                .is_some_and(|total| self.next_index >= total)
        {
            return self.finish(EndReason::FrameCountReached);
        }

        let timestamp = position_ms * MS_TO_S;

        if timestamp.is_nan() || timestamp < self.previous {
            self.regressions += 1;
            observability::record_clock_regression();

            match self.policy {
                EndOfStreamPolicy::TimestampRegression => {
                    debug!(
                        previous = self.previous,
                        timestamp, "frame timestamp regressed, end of stream"
                    );
                    return self.finish(EndReason::TimestampRegression);
                }
                EndOfStreamPolicy::FrameCount => {
                    warn!(
                        index = self.next_index,
                        previous = self.previous,
                        timestamp,
                        "frame timestamp regressed"
                    );
                    if !timestamp.is_finite() {
                        return self.finish(EndReason::TimestampRegression);
                    }
                }
            }
        }

        let index = self.next_index;
        self.next_index += 1;
        self.previous = timestamp;
        ClockTick::Frame { index, timestamp }
    }

    /// End the stream for an external reason (source exhausted, stop, limit)
    ///
    /// The first recorded reason is kept.
    pub fn finish(&mut self, reason: EndReason) -> ClockTick {
        let reason = *self.ended.get_or_insert(reason);
        ClockTick::EndOfStream(reason)
    }
}
