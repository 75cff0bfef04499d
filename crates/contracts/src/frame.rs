//! Frame - decoded video frame
//!
//! Produced one at a time by a `FrameSource`, consumed and discarded after
//! the estimator call.

use serde::{Deserialize, Serialize};

/// Decoded frame with its clock-derived timestamp
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based frame index
    pub index: u64,

    /// Frame timestamp (seconds)
    pub timestamp: f64,

    /// Pixel buffer
    pub image: ImageData,
}

/// Raw frame as reported by the video source, before clock handling
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Pixel buffer
    pub image: ImageData,

    /// Playback position reported by the source (milliseconds)
    pub position_ms: f64,
}

/// Image data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Pixel format
    pub format: ImageFormat,

    /// Row-major pixel data, `width * height * channels` bytes
    pub data: Vec<u8>,
}

impl ImageData {
    /// Create a zero-filled image
    pub fn blank(width: u32, height: u32, format: ImageFormat) -> Self {
        let len = width as usize * height as usize * format.channels();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the buffer length matches the declared geometry
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.pixel_count() * self.format.channels()
    }
}

/// Image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Gray8,
    Rgb8,
    Rgba8,
}

impl ImageFormat {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            ImageFormat::Gray8 => 1,
            ImageFormat::Rgb8 => 3,
            ImageFormat::Rgba8 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_image_has_consistent_buffer() {
        let img = ImageData::blank(4, 3, ImageFormat::Rgb8);
        assert_eq!(img.data.len(), 36);
        assert!(img.is_consistent());
    }

    #[test]
    fn inconsistent_buffer_detected() {
        let mut img = ImageData::blank(2, 2, ImageFormat::Gray8);
        img.data.pop();
        assert!(!img.is_consistent());
    }
}
