//! Compositor - 帧预处理
//!
//! 将解码后的帧缩放到工作分辨率，并施加遮挡遮罩 (镜面、夹爪区域)，
//! 然后交给估计器。
//!
//! - [`TrapezoidMask`]: 夹爪梯形的像素几何
//! - [`MaskCompositor`]: 遮罩图像 + 梯形区域的合成与施加
//! - [`FramePreparer`]: 实现 `FramePreprocessor`，供 `SyncDriver` 使用

mod geometry;
mod mask;
mod preprocess;

pub use geometry::TrapezoidMask;
pub use mask::{load_mask, MaskCompositor};
pub use preprocess::{resize_image, FramePreparer};

pub use image::imageops::FilterType;
