//! Frame / inertial binner
//!
//! Partitions the inertial timeline into per-frame batches with a single
//! forward-only cursor. A frame at time `t > 0` receives every remaining
//! sample with `timestamp <= t`; frames at or before zero receive nothing.
//! Across a whole session the cost is linear in frames plus samples.

use contracts::InertialSample;
use tracing::trace;

use crate::timeline::InertialTimeline;

/// Position of the next unconsumed sample in the timeline
///
/// Only the binner advances it and it never moves back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyncCursor {
    position: usize,
}

impl SyncCursor {
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Forward-only frame binner
#[derive(Debug, Clone, Default)]
pub struct FrameInertialBinner {
    cursor: SyncCursor,
}

impl FrameInertialBinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor
    pub fn cursor(&self) -> SyncCursor {
        self.cursor
    }

    /// Samples not yet handed out
    pub fn remaining(&self, timeline: &InertialTimeline) -> usize {
        timeline.len().saturating_sub(self.cursor.position)
    }

    /// Consume every sample up to and including `frame_timestamp`
    ///
    /// Returns an empty batch when `frame_timestamp <= 0` (or NaN) and once
    /// the timeline is exhausted.
    pub fn drain_until(
        &mut self,
        timeline: &InertialTimeline,
        frame_timestamp: f64,
    ) -> Vec<InertialSample> {
        let start = self.cursor.position;
        if frame_timestamp.is_nan() || frame_timestamp <= 0.0 {
            return Vec::new();
        }

        let samples = timeline.samples();
        let mut end = start;
        while end < samples.len() && samples[end].timestamp <= frame_timestamp {
            end += 1;
        }
        self.cursor.position = end;

        trace!(
            frame_timestamp,
            from = start,
            to = end,
            "inertial samples drained"
        );
        samples[start..end].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vector3;
    use rand::{Rng, SeedableRng};

    fn timeline(ts: &[f64]) -> InertialTimeline {
        let accel: Vec<_> = ts.iter().map(|&t| Vector3::new(t, 0.0, 0.0)).collect();
        let gyro = vec![Vector3::zeros(); ts.len()];
        InertialTimeline::from_parts(ts, &accel, &gyro).unwrap()
    }

    fn stamps(batch: &[InertialSample]) -> Vec<f64> {
        batch.iter().map(|s| s.timestamp).collect()
    }

    #[test]
    fn basic_interleaving() {
        let tl = timeline(&[0.000, 0.010, 0.020, 0.030, 0.040]);
        let mut binner = FrameInertialBinner::new();

        assert!(binner.drain_until(&tl, 0.000).is_empty());
        assert_eq!(stamps(&binner.drain_until(&tl, 0.015)), vec![0.000, 0.010]);
        assert_eq!(stamps(&binner.drain_until(&tl, 0.035)), vec![0.020, 0.030]);
        assert_eq!(binner.cursor().position(), 4);
        assert_eq!(binner.remaining(&tl), 1);
    }

    #[test]
    fn frame_exactly_on_sample_includes_it() {
        let tl = timeline(&[0.010, 0.020]);
        let mut binner = FrameInertialBinner::new();
        assert_eq!(stamps(&binner.drain_until(&tl, 0.010)), vec![0.010]);
        assert_eq!(stamps(&binner.drain_until(&tl, 0.020)), vec![0.020]);
    }

    #[test]
    fn non_positive_frames_consume_nothing() {
        let tl = timeline(&[0.000, 0.005]);
        let mut binner = FrameInertialBinner::new();
        assert!(binner.drain_until(&tl, 0.0).is_empty());
        assert!(binner.drain_until(&tl, -1.0).is_empty());
        assert!(binner.drain_until(&tl, f64::NAN).is_empty());
        assert_eq!(binner.cursor().position(), 0);
    }

    #[test]
    fn exhausted_timeline_yields_empty_batches() {
        let tl = timeline(&[0.001]);
        let mut binner = FrameInertialBinner::new();
        assert_eq!(binner.drain_until(&tl, 1.0).len(), 1);
        assert!(binner.drain_until(&tl, 2.0).is_empty());
        assert!(binner.drain_until(&tl, 3.0).is_empty());

        let empty = InertialTimeline::empty();
        let mut binner = FrameInertialBinner::new();
        assert!(binner.drain_until(&empty, 1.0).is_empty());
    }

    #[test]
    fn lower_frame_timestamp_never_rewinds() {
        let tl = timeline(&[0.001, 0.002, 0.003]);
        let mut binner = FrameInertialBinner::new();
        binner.drain_until(&tl, 0.002);
        assert!(binner.drain_until(&tl, 0.001).is_empty());
        assert_eq!(binner.cursor().position(), 2);
    }

    #[test]
    fn randomized_partition_is_exact_and_monotone() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let n = rng.random_range(0..400);
            let mut ts: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..10.0)).collect();
            ts.sort_by(f64::total_cmp);
            let tl = timeline(&ts);

            let m = rng.random_range(1..200);
            let mut frames: Vec<f64> = (0..m).map(|_| rng.random_range(-1.0..12.0)).collect();
            frames.sort_by(f64::total_cmp);

            let mut binner = FrameInertialBinner::new();
            let mut collected = Vec::new();
            let mut last_cursor = binner.cursor();
            let mut previous = f64::NEG_INFINITY;

            for &t in &frames {
                let batch = binner.drain_until(&tl, t);
                assert!(binner.cursor() >= last_cursor);
                last_cursor = binner.cursor();

                for s in &batch {
                    assert!(s.timestamp <= t);
                    if previous > 0.0 {
                        assert!(s.timestamp > previous);
                    }
                }
                if t > 0.0 {
                    previous = t;
                }
                collected.extend(stamps(&batch));
            }

            // every sample up to the last positive frame, each exactly once
            let last_positive = frames.iter().copied().filter(|t| *t > 0.0).fold(f64::NAN, f64::max);
            let expected: Vec<f64> = ts
                .iter()
                .copied()
                .filter(|t| !last_positive.is_nan() && *t <= last_positive)
                .collect();
            assert_eq!(collected, expected);
        }
    }

    #[test]
    fn rerun_is_deterministic() {
        let tl = timeline(&[0.0, 0.004, 0.008, 0.012, 0.016, 0.020]);
        let frames = [0.0, 0.0, 0.01, 0.01, 0.017, 0.05];

        let run = || {
            let mut binner = FrameInertialBinner::new();
            frames
                .iter()
                .map(|&t| stamps(&binner.drain_until(&tl, t)))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
