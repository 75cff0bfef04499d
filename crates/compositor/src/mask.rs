//! Mask compositor
//!
//! Blanks occluded pixels (mirrors, gripper) before frames reach the
//! estimator. A non-zero mask pixel means "occluded": the frame pixel is
//! set to zero in every channel.

use std::path::Path;

use contracts::{ContractError, GripperRegion, ImageData, MaskSettings};
use image::imageops::{self, FilterType};
use image::GrayImage;
use tracing::{debug, info, warn};

use crate::geometry::TrapezoidMask;

/// Occlusion mask applied to every frame
#[derive(Debug, Clone)]
pub struct MaskCompositor {
    /// Loaded single-channel mask, as read from disk
    source: Option<GrayImage>,
    gripper: GripperRegion,
    trapezoid: TrapezoidMask,
    /// Effective mask at the last seen frame resolution
    cached: Option<GrayImage>,
}

/// Load a mask image as 8-bit grayscale
///
/// # Errors
/// `MaskUnreadable` when the file is missing or cannot be decoded
pub fn load_mask(path: impl AsRef<Path>) -> Result<GrayImage, ContractError> {
    let path = path.as_ref();
    let mask = image::open(path)
        .map_err(|e| ContractError::MaskUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .into_luma8();

    info!(
        path = %path.display(),
        width = mask.width(),
        height = mask.height(),
        "mask loaded"
    );
    Ok(mask)
}

impl MaskCompositor {
    pub fn new(source: Option<GrayImage>, gripper: GripperRegion, trapezoid: TrapezoidMask) -> Self {
        Self {
            source,
            gripper,
            trapezoid,
            cached: None,
        }
    }

    /// Trapezoid-only compositor that blanks the gripper region
    pub fn gripper_only(trapezoid: TrapezoidMask) -> Self {
        Self::new(None, GripperRegion::Blank, trapezoid)
    }

    /// Build from settings, loading the mask image if configured
    pub fn from_settings(settings: &MaskSettings) -> Result<Self, ContractError> {
        let source = settings.image_path.as_ref().map(load_mask).transpose()?;
        Ok(Self::new(
            source,
            settings.gripper,
            TrapezoidMask::new(settings.trapezoid),
        ))
    }

    /// Whether applying the compositor can change a frame
    pub fn is_active(&self) -> bool {
        self.source.is_some() || self.gripper == GripperRegion::Blank
    }

    pub fn gripper(&self) -> GripperRegion {
        self.gripper
    }

    /// Effective mask for frames of the given size
    ///
    /// Built once per resolution. `None` when nothing is masked.
    pub fn effective_mask(&mut self, width: u32, height: u32) -> Option<&GrayImage> {
        if !self.is_active() {
            return None;
        }

        let fresh = matches!(&self.cached, Some(m) if m.dimensions() == (width, height));
        if !fresh {
            self.cached = Some(self.build(width, height));
        }
        self.cached.as_ref()
    }

    fn build(&self, width: u32, height: u32) -> GrayImage {
        let mut mask = match &self.source {
            Some(source) if source.dimensions() == (width, height) => source.clone(),
            Some(source) => {
                warn!(
                    from = ?source.dimensions(),
                    to = ?(width, height),
                    "mask size mismatch, resizing"
                );
                imageops::resize(source, width, height, FilterType::Nearest)
            }
            None => GrayImage::new(width, height),
        };

        match self.gripper {
            GripperRegion::Off => {}
            // keep the gripper visible even where the mask covers it
            GripperRegion::Carve => self.trapezoid.fill(&mut mask, 0),
            GripperRegion::Blank => self.trapezoid.fill(&mut mask, 255),
        }

        debug!(width, height, gripper = ?self.gripper, "effective mask built");
        mask
    }

    /// Zero every frame pixel under a non-zero mask pixel
    ///
    /// # Errors
    /// Fails for an image whose buffer does not match its dimensions
    pub fn apply(&mut self, image: &mut ImageData) -> Result<(), ContractError> {
        if !image.is_consistent() {
            return Err(ContractError::Other(format!(
                "image buffer of {} bytes does not match {}x{} {:?}",
                image.data.len(),
                image.width,
                image.height,
                image.format
            )));
        }

        let channels = image.format.channels();
        let Some(mask) = self.effective_mask(image.width, image.height) else {
            return Ok(());
        };

        let mut blanked = 0u64;
        for (pixel, m) in image.data.chunks_exact_mut(channels).zip(mask.as_raw()) {
            if *m != 0 {
                pixel.fill(0);
                blanked += 1;
            }
        }

        metrics::histogram!("gopro_syncer_masked_pixels").record(blanked as f64);
        Ok(())
    }
}
