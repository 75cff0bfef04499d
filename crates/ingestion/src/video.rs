//! Frame sources
//!
//! - `ImageSequenceSource`: 已解码的帧序列目录 (按文件名排序)
//! - `ScriptedFrameSource`: 显式给定播放位置的合成帧，用于测试与 mock 模式

use std::path::{Path, PathBuf};

use contracts::{ContractError, DecodedFrame, FrameSource, ImageData, ImageFormat};
use tracing::{debug, info, trace};

use crate::error::{IngestionError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Frame rate for an image sequence with no rate from settings or telemetry
pub const DEFAULT_SEQUENCE_FPS: f64 = 30.0;

/// Directory of decoded video frames
///
/// Playback position of frame `i` is `i * 1000 / fps` milliseconds.
#[derive(Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    fps: f64,
    next: usize,
}

impl ImageSequenceSource {
    /// Open a frame directory
    ///
    /// # Errors
    /// Missing or empty directory, or a non-positive frame rate
    pub fn open(dir: impl AsRef<Path>, fps: f64) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.display().to_string();

        if !(fps.is_finite() && fps > 0.0) {
            return Err(IngestionError::VideoOpen {
                path,
                message: format!("invalid frame rate {fps}"),
            });
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| IngestionError::VideoOpen {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(IngestionError::VideoOpen {
                path,
                message: "no image frames found".to_string(),
            });
        }

        info!(dir = %path, frames = files.len(), fps, "image sequence opened");

        Ok(Self {
            dir,
            files,
            fps,
            next: 0,
        })
    }

    /// Frame files in playback order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn read_frame(&mut self) -> std::result::Result<Option<DecodedFrame>, ContractError> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        let index = self.next as u64;

        let decoded = image::open(path).map_err(|e| {
            ContractError::from(IngestionError::FrameDecode {
                index,
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let position_ms = index as f64 * 1000.0 / self.fps;
        self.next += 1;

        trace!(index, position_ms, width, height, "frame decoded");
        metrics::counter!("gopro_syncer_frames_decoded_total").increment(1);

        Ok(Some(DecodedFrame {
            image: ImageData {
                width,
                height,
                format: ImageFormat::Rgb8,
                data: rgb.into_raw(),
            },
            position_ms,
        }))
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.files.len() as u64)
    }

    fn nominal_fps(&self) -> Option<f64> {
        Some(self.fps)
    }
}

/// Synthetic frames at scripted playback positions
///
/// Each frame is a uniform Gray8 image whose value is its index modulo 256.
#[derive(Debug, Clone)]
pub struct ScriptedFrameSource {
    positions_ms: Vec<f64>,
    width: u32,
    height: u32,
    frame_count: Option<u64>,
    fps: Option<f64>,
    next: usize,
}

impl ScriptedFrameSource {
    /// Frames at the given positions (milliseconds), in order
    pub fn new(positions_ms: impl IntoIterator<Item = f64>, width: u32, height: u32) -> Self {
        Self {
            positions_ms: positions_ms.into_iter().collect(),
            width,
            height,
            frame_count: None,
            fps: None,
            next: 0,
        }
    }

    /// `count` evenly spaced frames at `fps`, starting at position 0
    pub fn regular(count: usize, fps: f64, width: u32, height: u32) -> Self {
        let positions = (0..count).map(|i| i as f64 * 1000.0 / fps);
        Self::new(positions, width, height)
            .with_frame_count(count as u64)
            .with_fps(fps)
    }

    /// Report a container frame count
    pub fn with_frame_count(mut self, count: u64) -> Self {
        self.frame_count = Some(count);
        self
    }

    /// Report a nominal frame rate
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Frames not yet read
    pub fn remaining(&self) -> usize {
        self.positions_ms.len().saturating_sub(self.next)
    }
}

impl FrameSource for ScriptedFrameSource {
    fn describe(&self) -> String {
        format!("scripted({} frames)", self.positions_ms.len())
    }

    fn read_frame(&mut self) -> std::result::Result<Option<DecodedFrame>, ContractError> {
        let Some(&position_ms) = self.positions_ms.get(self.next) else {
            return Ok(None);
        };
        let mut image = ImageData::blank(self.width, self.height, ImageFormat::Gray8);
        image.data.fill((self.next % 256) as u8);
        self.next += 1;

        debug!(position_ms, "scripted frame");
        Ok(Some(DecodedFrame { image, position_ms }))
    }

    fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    fn nominal_fps(&self) -> Option<f64> {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_yields_positions_in_order() {
        let mut source = ScriptedFrameSource::new([0.0, 33.0, 66.0], 4, 2);
        assert_eq!(source.frame_count(), None);

        let first = source.read_frame().unwrap().unwrap();
        assert_eq!(first.position_ms, 0.0);
        assert_eq!(first.image.data.len(), 8);
        assert!(first.image.data.iter().all(|&b| b == 0));

        let second = source.read_frame().unwrap().unwrap();
        assert_eq!(second.position_ms, 33.0);
        assert!(second.image.data.iter().all(|&b| b == 1));

        assert_eq!(source.remaining(), 1);
        source.read_frame().unwrap();
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn regular_source_reports_metadata() {
        let mut source = ScriptedFrameSource::regular(3, 50.0, 2, 2);
        assert_eq!(source.frame_count(), Some(3));
        assert_eq!(source.nominal_fps(), Some(50.0));
        source.read_frame().unwrap();
        let f = source.read_frame().unwrap().unwrap();
        assert!((f.position_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn image_sequence_reads_sorted_frames() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("frame_0002.png", 20u8), ("frame_0001.png", 10u8)] {
            let img = image::RgbImage::from_pixel(3, 2, image::Rgb([value, value, value]));
            img.save(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 25.0).unwrap();
        assert_eq!(source.frame_count(), Some(2));

        let first = source.read_frame().unwrap().unwrap();
        assert_eq!(first.position_ms, 0.0);
        assert_eq!(first.image.format, ImageFormat::Rgb8);
        assert_eq!((first.image.width, first.image.height), (3, 2));
        assert_eq!(first.image.data[0], 10);

        let second = source.read_frame().unwrap().unwrap();
        assert!((second.position_ms - 40.0).abs() < 1e-9);
        assert_eq!(second.image.data[0], 20);

        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn image_sequence_rejects_empty_or_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path(), 30.0),
            Err(IngestionError::VideoOpen { .. })
        ));
        assert!(ImageSequenceSource::open(dir.path().join("missing"), 30.0).is_err());
        assert!(ImageSequenceSource::open(dir.path(), 0.0).is_err());
    }

    #[test]
    fn undecodable_frame_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let mut source = ImageSequenceSource::open(dir.path(), 30.0).unwrap();
        assert!(matches!(
            source.read_frame(),
            Err(ContractError::FrameDecode { index: 0, .. })
        ));
    }
}
