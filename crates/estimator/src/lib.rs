//! # Estimator
//!
//! 视觉惯性估计器边界的本地实现。
//!
//! 负责：
//! - `RecordingEstimator`: 记录每次 `track` 调用的替身估计器
//! - 轨迹 CSV 导出

pub mod error;
pub mod recording;
pub mod trajectory;

pub use contracts::{Estimator, TrackingResult, TrackingState};
pub use error::EstimatorError;
pub use recording::RecordingEstimator;
pub use trajectory::{trajectory_row, write_trajectory, write_trajectory_to, TRAJECTORY_HEADER};
