//! Frame preparation: resize to the working resolution, then mask.

use contracts::{ContractError, FramePreprocessor, ImageData, ImageFormat, SettingsBlueprint};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Pixel, Rgb, Rgba};
use tracing::debug;

use crate::mask::MaskCompositor;

/// Resize `image` to `width` x `height`
///
/// # Errors
/// Fails for an image whose buffer does not match its dimensions
pub fn resize_image(
    image: &ImageData,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<ImageData, ContractError> {
    let data = match image.format {
        ImageFormat::Gray8 => resize_buffer::<Luma<u8>>(image, width, height, filter)?,
        ImageFormat::Rgb8 => resize_buffer::<Rgb<u8>>(image, width, height, filter)?,
        ImageFormat::Rgba8 => resize_buffer::<Rgba<u8>>(image, width, height, filter)?,
    };

    Ok(ImageData {
        width,
        height,
        format: image.format,
        data,
    })
}

fn resize_buffer<P>(
    image: &ImageData,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Vec<u8>, ContractError>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let buffer: ImageBuffer<P, &[u8]> =
        ImageBuffer::from_raw(image.width, image.height, image.data.as_slice()).ok_or_else(
            || {
                ContractError::Other(format!(
                    "image buffer of {} bytes does not match {}x{} {:?}",
                    image.data.len(),
                    image.width,
                    image.height,
                    image.format
                ))
            },
        )?;
    Ok(imageops::resize(&buffer, width, height, filter).into_raw())
}

/// Resizes frames to the working resolution and applies the occlusion mask
#[derive(Debug, Clone)]
pub struct FramePreparer {
    width: u32,
    height: u32,
    filter: FilterType,
    compositor: Option<MaskCompositor>,
}

impl FramePreparer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterType::Triangle,
            compositor: None,
        }
    }

    /// Preparer for the settings' camera resolution and mask
    ///
    /// # Errors
    /// `MaskUnreadable` when the configured mask image cannot be loaded
    pub fn from_settings(settings: &SettingsBlueprint) -> Result<Self, ContractError> {
        let (width, height) = settings.working_resolution();
        let compositor = MaskCompositor::from_settings(&settings.mask)?;
        Ok(Self::new(width, height).with_compositor(compositor))
    }

    /// Apply `compositor` after resizing (dropped when inactive)
    pub fn with_compositor(mut self, compositor: MaskCompositor) -> Self {
        self.compositor = compositor.is_active().then_some(compositor);
        self
    }

    /// Resampling filter for the resize
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_masking(&self) -> bool {
        self.compositor.is_some()
    }
}

impl FramePreprocessor for FramePreparer {
    fn name(&self) -> &str {
        "frame_preparer"
    }

    fn process(&mut self, image: &mut ImageData) -> Result<(), ContractError> {
        if (image.width, image.height) != (self.width, self.height) {
            debug!(
                from = ?(image.width, image.height),
                to = ?(self.width, self.height),
                "resizing frame"
            );
            *image = resize_image(image, self.width, self.height, self.filter)?;
        }

        if let Some(compositor) = self.compositor.as_mut() {
            compositor.apply(image)?;
        }
        Ok(())
    }
}
