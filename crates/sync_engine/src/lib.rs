//! # Sync Engine
//!
//! 视觉-惯性时间同步引擎。
//!
//! 负责：
//! - 加速度计/陀螺仪配对，构建惯性时间线
//! - 帧时钟与视频结束检测
//! - 单向游标分箱：每帧获得 (上一帧, 当前帧] 内的惯性采样
//! - 回放节奏与主循环
//!
//! ## 使用示例
//!
//! ```ignore
//! use sync_engine::{pacer_for, InertialTimeline, SyncDriver, SyncSession};
//!
//! let timeline = InertialTimeline::from_telemetry(&telemetry, &config.pairing)?;
//! let session = SyncSession::new(timeline, &config, source.frame_count());
//! let pacer = pacer_for(config.pacing, source.nominal_fps());
//!
//! let mut driver = SyncDriver::new(session, pacer).with_max_frames(Some(500));
//! let summary = driver.run(&mut source, &mut estimator)?;
//! ```

mod binner;
mod clock;
mod driver;
mod pacing;
mod pairing;
mod session;
mod timeline;

// Re-exports
pub use binner::{FrameInertialBinner, SyncCursor};
pub use clock::{ClockTick, FrameClock, MS_TO_S, SENTINEL_TIMESTAMP};
pub use driver::{RunSummary, SyncDriver, DEFAULT_REPORT_INTERVAL};
pub use pacing::{pacer_for, NoPacing, Pacer, RealTimePacing};
pub use pairing::pair_streams;
pub use session::{SessionStep, SyncSession};
pub use timeline::InertialTimeline;

// Re-export contracts types
pub use contracts::{
    EndOfStreamPolicy, EndReason, InertialBatch, PacingMode, PairingConfig, PairingMode,
    SessionStats, SyncSessionConfig, SyncedPacket,
};
