//! SettingsBlueprint - Config Loader 输出
//!
//! 描述一次运行的完整配置：相机分辨率、同步策略、遮罩、诊断输出。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{EndOfStreamPolicy, PacingMode, PairingConfig, SyncSessionConfig};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的运行配置蓝图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 相机设置 (必填)
    pub camera: CameraSettings,

    /// 同步策略配置
    #[serde(default)]
    pub sync: SyncSettings,

    /// 遮挡遮罩配置
    #[serde(default)]
    pub mask: MaskSettings,

    /// 诊断输出配置
    #[serde(default)]
    pub report: ReportSettings,
}

/// 相机设置：工作分辨率与帧率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// 工作分辨率宽度 (像素)，必须 > 0
    pub width: u32,

    /// 工作分辨率高度 (像素)，必须 > 0
    pub height: u32,

    /// 名义帧率覆盖 (可选，否则使用视频源报告值)
    #[serde(default)]
    pub fps: Option<f64>,
}

/// 同步策略配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// 视频结束检测策略
    #[serde(default)]
    pub end_of_stream: EndOfStreamPolicy,

    /// 回放节奏
    #[serde(default)]
    pub pacing: PacingMode,

    /// 加速度计/陀螺仪配对
    #[serde(default)]
    pub pairing: PairingConfig,

    /// 遥测文档中的设备键 (默认 "1")
    #[serde(default)]
    pub telemetry_device: Option<String>,
}

/// 遮挡遮罩配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskSettings {
    /// 单通道遮罩图像 (非零像素被遮挡)
    #[serde(default)]
    pub image_path: Option<PathBuf>,

    /// 夹爪梯形区域处理方式
    #[serde(default)]
    pub gripper: GripperRegion,

    /// 梯形几何参数 (图像高度的比例)
    #[serde(default)]
    pub trapezoid: TrapezoidParams,
}

impl MaskSettings {
    /// 是否需要遮罩处理
    pub fn is_active(&self) -> bool {
        self.image_path.is_some() || self.gripper == GripperRegion::Blank
    }
}

/// 夹爪梯形区域处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GripperRegion {
    /// 不处理
    Off,
    /// 从遮罩图像中挖去梯形区域 (梯形内保持可见)
    #[default]
    Carve,
    /// 将梯形区域加入遮罩
    Blank,
}

/// 梯形几何参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidParams {
    /// 高度 (图像高度比例)
    pub height: f64,
    /// 顶边宽度 (图像高度比例)
    pub top_width: f64,
    /// 底边宽度 (图像高度比例)
    pub bottom_width: f64,
}

impl Default for TrapezoidParams {
    fn default() -> Self {
        Self {
            height: 0.37,
            top_width: 0.25,
            bottom_width: 1.4,
        }
    }
}

/// 诊断输出配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// 每隔多少帧输出一次耗时摘要 (0 = 禁用)
    #[serde(default = "default_report_interval")]
    pub interval_frames: u64,
}

fn default_report_interval() -> u64 {
    100
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            interval_frames: default_report_interval(),
        }
    }
}

impl SettingsBlueprint {
    /// Build a SyncSessionConfig from the sync settings
    pub fn to_sync_session_config(&self) -> SyncSessionConfig {
        SyncSessionConfig {
            end_of_stream: self.sync.end_of_stream,
            pairing: self.sync.pairing,
            pacing: self.sync.pacing,
        }
    }

    /// Working resolution every frame is resized to
    pub fn working_resolution(&self) -> (u32, u32) {
        (self.camera.width, self.camera.height)
    }

    /// Telemetry device key, defaulting to `"1"`
    pub fn telemetry_device(&self) -> &str {
        self.sync.telemetry_device.as_deref().unwrap_or("1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PairingMode;

    fn sample_blueprint() -> SettingsBlueprint {
        SettingsBlueprint {
            version: ConfigVersion::V1,
            camera: CameraSettings {
                width: 960,
                height: 540,
                fps: None,
            },
            sync: SyncSettings::default(),
            mask: MaskSettings::default(),
            report: ReportSettings::default(),
        }
    }

    #[test]
    fn sync_session_config_defaults() {
        let blueprint = sample_blueprint();
        let config = blueprint.to_sync_session_config();
        assert_eq!(config.end_of_stream, EndOfStreamPolicy::TimestampRegression);
        assert_eq!(config.pacing, PacingMode::RealTime);
        assert_eq!(config.pairing.mode, PairingMode::Auto);
        assert_eq!(blueprint.telemetry_device(), "1");
        assert_eq!(blueprint.working_resolution(), (960, 540));
    }

    #[test]
    fn sync_session_config_overrides() {
        let mut blueprint = sample_blueprint();
        blueprint.sync.end_of_stream = EndOfStreamPolicy::FrameCount;
        blueprint.sync.pacing = PacingMode::None;
        blueprint.sync.pairing = PairingConfig {
            mode: PairingMode::Nearest,
            tolerance_ms: 1.0,
        };
        blueprint.sync.telemetry_device = Some("2".into());

        let config = blueprint.to_sync_session_config();
        assert_eq!(config.end_of_stream, EndOfStreamPolicy::FrameCount);
        assert_eq!(config.pacing, PacingMode::None);
        assert_eq!(config.pairing.mode, PairingMode::Nearest);
        assert_eq!(blueprint.telemetry_device(), "2");
    }

    #[test]
    fn mask_activity() {
        let mut mask = MaskSettings::default();
        assert!(!mask.is_active());
        mask.gripper = GripperRegion::Blank;
        assert!(mask.is_active());
        mask.gripper = GripperRegion::Carve;
        mask.image_path = Some(PathBuf::from("mask.png"));
        assert!(mask.is_active());
    }

    #[test]
    fn trapezoid_defaults() {
        let t = TrapezoidParams::default();
        assert_eq!((t.height, t.top_width, t.bottom_width), (0.37, 0.25, 1.4));
    }
}
