//! InertialSample - 惯性数据
//!
//! 加速度计与陀螺仪配对后的单个惯性采样。

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// 惯性采样
///
/// 时间戳相对于加速度计流的第一个采样 (秒)。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialSample {
    /// 零基时间戳 (seconds)
    pub timestamp: f64,

    /// 线加速度 (m/s²)
    pub linear_acceleration: Vector3<f64>,

    /// 角速度 (rad/s)
    pub angular_velocity: Vector3<f64>,
}

impl InertialSample {
    /// 创建惯性采样
    pub fn new(
        timestamp: f64,
        linear_acceleration: Vector3<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Self {
        Self {
            timestamp,
            linear_acceleration,
            angular_velocity,
        }
    }
}

/// 单帧惯性批次
///
/// 通常覆盖 (window_start, window_end]，每帧重新构建。
/// 时间戳 <= 0 的帧不消费采样，剩余的 t <= 0 采样 (含 t = 0) 全部归入
/// 第一个正时间戳帧，此时下界实际为闭区间。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InertialBatch {
    /// 所属帧序号
    pub frame_index: u64,

    /// 上一帧时间戳 (首帧为哨兵 -100 s)
    pub window_start: f64,

    /// 当前帧时间戳 (含)
    pub window_end: f64,

    /// 按时间排序的采样
    pub samples: Vec<InertialSample>,
}

impl InertialBatch {
    /// 采样数量
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 是否为空批次
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
