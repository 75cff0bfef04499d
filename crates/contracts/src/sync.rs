//! SyncedPacket - Sync Engine output
//!
//! Time-aligned frame + inertial batch handed to the estimator.

use serde::{Deserialize, Serialize};

use crate::{Frame, InertialBatch};

/// Synchronized packet
///
/// One decoded frame and every inertial sample in its time window.
#[derive(Debug, Clone)]
pub struct SyncedPacket {
    /// Frame with clock-derived timestamp
    pub frame: Frame,

    /// Inertial samples for (previous frame, this frame]
    pub batch: InertialBatch,
}

/// Why a synchronization session stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Still running
    #[default]
    Running,
    /// Frame clock moved backwards
    TimestampRegression,
    /// Reported frame count reached
    FrameCountReached,
    /// Source returned no more frames
    SourceExhausted,
    /// Frame limit requested by the caller
    FrameLimit,
    /// Stop requested externally
    Stopped,
}

/// Session statistics (for diagnostics)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Frames turned into packets
    pub frames_processed: u64,

    /// Inertial samples handed out across all batches
    pub samples_consumed: u64,

    /// Timeline length at session start
    pub timeline_len: usize,

    /// Packets whose batch was empty
    pub empty_batches: u64,

    /// Frames at or before time zero (never consume samples)
    pub non_positive_frames: u64,

    /// Backwards clock steps seen (terminal or not, depending on policy)
    pub clock_regressions: u64,

    /// Termination cause
    pub end_reason: EndReason,
}

impl SessionStats {
    /// Samples never handed to any frame
    pub fn samples_remaining(&self) -> usize {
        self.timeline_len
            .saturating_sub(self.samples_consumed as usize)
    }
}
