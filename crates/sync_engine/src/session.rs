//! Sync session
//!
//! Owns everything one run mutates: the timeline, the binner cursor, the
//! frame clock and the statistics. Identical inputs give identical batches.

use contracts::{
    DecodedFrame, EndReason, Frame, InertialBatch, SessionStats, SyncSessionConfig, SyncedPacket,
};
use tracing::{debug, info, instrument};

use crate::binner::FrameInertialBinner;
use crate::clock::{ClockTick, FrameClock};
use crate::timeline::InertialTimeline;

/// Result of pushing one decoded frame
#[derive(Debug, Clone)]
pub enum SessionStep {
    /// Frame paired with its inertial batch
    Packet(SyncedPacket),
    /// The video has ended, no packet
    EndOfStream(EndReason),
}

/// Single-threaded synchronization session
#[derive(Debug)]
pub struct SyncSession {
    timeline: InertialTimeline,
    binner: FrameInertialBinner,
    clock: FrameClock,
    stats: SessionStats,
}

impl SyncSession {
    /// Create a session over `timeline`
    ///
    /// `expected_frames` is the source's reported frame count, if any.
    pub fn new(
        timeline: InertialTimeline,
        config: &SyncSessionConfig,
        expected_frames: Option<u64>,
    ) -> Self {
        let stats = SessionStats {
            timeline_len: timeline.len(),
            ..Default::default()
        };

        info!(
            samples = timeline.len(),
            end_of_stream = ?config.end_of_stream,
            expected_frames = ?expected_frames,
            "sync session created"
        );

        Self {
            timeline,
            binner: FrameInertialBinner::new(),
            clock: FrameClock::new(config.end_of_stream, expected_frames),
            stats,
        }
    }

    /// Timestamp the frame, drain its inertial batch and build the packet
    #[instrument(
        level = "trace",
        name = "sync_session_push",
        skip(self, decoded),
        fields(position_ms = decoded.position_ms)
    )]
    pub fn push_frame(&mut self, decoded: DecodedFrame) -> SessionStep {
        let window_start = self.clock.previous_timestamp();

        let tick = self.clock.tick(decoded.position_ms);
        self.stats.clock_regressions = self.clock.regressions();

        let (index, timestamp) = match tick {
            ClockTick::Frame { index, timestamp } => (index, timestamp),
            ClockTick::EndOfStream(reason) => return self.end(reason),
        };

        let samples = self.binner.drain_until(&self.timeline, timestamp);

        self.stats.frames_processed += 1;
        self.stats.samples_consumed += samples.len() as u64;
        if samples.is_empty() {
            self.stats.empty_batches += 1;
        }
        if timestamp <= 0.0 {
            self.stats.non_positive_frames += 1;
        }

        let packet = SyncedPacket {
            frame: Frame {
                index,
                timestamp,
                image: decoded.image,
            },
            batch: InertialBatch {
                frame_index: index,
                window_start,
                window_end: timestamp,
                samples,
            },
        };
        observability::record_packet_metrics(&packet);

        SessionStep::Packet(packet)
    }

    /// End the session for an external reason
    ///
    /// A session already ended keeps its first reason.
    pub fn finish(&mut self, reason: EndReason) -> EndReason {
        match self.clock.finish(reason) {
            ClockTick::EndOfStream(reason) => {
                self.end(reason);
                reason
            }
            ClockTick::Frame { .. } => reason,
        }
    }

    fn end(&mut self, reason: EndReason) -> SessionStep {
        if self.stats.end_reason == EndReason::Running {
            self.stats.end_reason = reason;
            observability::record_end_of_stream(reason);
            observability::record_samples_remaining(self.stats.samples_remaining());
            debug!(
                ?reason,
                frames = self.stats.frames_processed,
                remaining = self.stats.samples_remaining(),
                "sync session ended"
            );
        }
        SessionStep::EndOfStream(self.stats.end_reason)
    }

    pub fn is_finished(&self) -> bool {
        self.stats.end_reason != EndReason::Running
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn timeline(&self) -> &InertialTimeline {
        &self.timeline
    }

    /// Frame clock (read-only)
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Samples not yet handed to any frame
    pub fn samples_remaining(&self) -> usize {
        self.binner.remaining(&self.timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EndOfStreamPolicy, ImageData, ImageFormat, Vector3};

    fn timeline(ts: &[f64]) -> InertialTimeline {
        let accel: Vec<_> = ts.iter().map(|&t| Vector3::new(t, 0.0, 0.0)).collect();
        let gyro = vec![Vector3::zeros(); ts.len()];
        InertialTimeline::from_parts(ts, &accel, &gyro).unwrap()
    }

    fn decoded(position_ms: f64) -> DecodedFrame {
        DecodedFrame {
            image: ImageData::blank(2, 2, ImageFormat::Gray8),
            position_ms,
        }
    }

    fn packet(step: SessionStep) -> SyncedPacket {
        match step {
            SessionStep::Packet(p) => p,
            SessionStep::EndOfStream(r) => panic!("unexpected end: {r:?}"),
        }
    }

    fn stamps(p: &SyncedPacket) -> Vec<f64> {
        p.batch.samples.iter().map(|s| s.timestamp).collect()
    }

    #[test]
    fn basic_interleaving_with_windows() {
        let mut session = SyncSession::new(
            timeline(&[0.000, 0.010, 0.020, 0.030, 0.040]),
            &SyncSessionConfig::default(),
            None,
        );

        let p0 = packet(session.push_frame(decoded(0.0)));
        assert_eq!(p0.frame.index, 0);
        assert!(p0.batch.is_empty());
        assert_eq!(p0.batch.window_start, crate::SENTINEL_TIMESTAMP);

        let p1 = packet(session.push_frame(decoded(15.0)));
        assert_eq!(stamps(&p1), vec![0.000, 0.010]);
        assert_eq!(p1.batch.window_start, 0.0);
        assert!((p1.batch.window_end - 0.015).abs() < 1e-12);

        let p2 = packet(session.push_frame(decoded(35.0)));
        assert_eq!(stamps(&p2), vec![0.020, 0.030]);

        let stats = session.stats();
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.samples_consumed, 4);
        assert_eq!(stats.empty_batches, 1);
        assert_eq!(stats.non_positive_frames, 1);
        assert_eq!(session.samples_remaining(), 1);
    }

    #[test]
    fn first_positive_frame_takes_samples_at_zero() {
        let mut session = SyncSession::new(
            timeline(&[0.000, 0.005, 0.010, 0.020]),
            &SyncSessionConfig::default(),
            None,
        );

        let early = packet(session.push_frame(decoded(-20.0)));
        assert_eq!(early.batch.window_start, crate::SENTINEL_TIMESTAMP);
        assert!(early.batch.is_empty());

        let zero = packet(session.push_frame(decoded(0.0)));
        assert!(zero.batch.is_empty());

        // lower bound inclusive here: the sample at window_start = 0 is included
        let first = packet(session.push_frame(decoded(12.0)));
        assert_eq!(first.batch.window_start, 0.0);
        assert_eq!(stamps(&first), vec![0.000, 0.005, 0.010]);

        let next = packet(session.push_frame(decoded(25.0)));
        assert!((next.batch.window_start - 0.012).abs() < 1e-12);
        assert_eq!(stamps(&next), vec![0.020]);
        assert_eq!(session.stats().non_positive_frames, 2);
    }

    #[test]
    fn regression_ends_without_packet() {
        let mut session = SyncSession::new(
            timeline(&[0.001, 0.002]),
            &SyncSessionConfig::default(),
            None,
        );
        packet(session.push_frame(decoded(0.0)));
        packet(session.push_frame(decoded(33.0)));

        assert!(matches!(
            session.push_frame(decoded(0.0)),
            SessionStep::EndOfStream(EndReason::TimestampRegression)
        ));
        assert!(session.is_finished());
        assert_eq!(session.stats().clock_regressions, 1);
        assert_eq!(session.stats().frames_processed, 2);
    }

    #[test]
    fn finish_records_first_reason() {
        let mut session =
            SyncSession::new(InertialTimeline::empty(), &SyncSessionConfig::default(), None);
        assert_eq!(session.finish(EndReason::SourceExhausted), EndReason::SourceExhausted);
        assert_eq!(session.finish(EndReason::Stopped), EndReason::SourceExhausted);
        assert_eq!(session.stats().end_reason, EndReason::SourceExhausted);
    }

    #[test]
    fn frame_count_policy_stops_at_total() {
        let config = SyncSessionConfig {
            end_of_stream: EndOfStreamPolicy::FrameCount,
            ..Default::default()
        };
        let mut session = SyncSession::new(timeline(&[0.001]), &config, Some(2));
        packet(session.push_frame(decoded(10.0)));
        packet(session.push_frame(decoded(5.0)));
        assert!(matches!(
            session.push_frame(decoded(20.0)),
            SessionStep::EndOfStream(EndReason::FrameCountReached)
        ));
        assert_eq!(session.stats().clock_regressions, 1);
    }

    #[test]
    fn empty_timeline_gives_empty_batches() {
        let mut session =
            SyncSession::new(InertialTimeline::empty(), &SyncSessionConfig::default(), None);
        for pos in [0.0, 33.0, 66.0] {
            assert!(packet(session.push_frame(decoded(pos))).batch.is_empty());
        }
        assert_eq!(session.stats().empty_batches, 3);
    }
}
