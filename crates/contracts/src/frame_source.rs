//! FrameSource trait - video source abstraction
//!
//! Decouples the sync loop from concrete decoders. Real decoders and
//! scripted test sources implement the same interface.

use crate::{ContractError, DecodedFrame, ImageData};

/// Sequential video frame source
///
/// # Example
///
/// ```ignore
/// let mut source: Box<dyn FrameSource> = open_source()?;
/// while let Some(decoded) = source.read_frame()? {
///     println!("frame at {} ms", decoded.position_ms);
/// }
/// ```
pub trait FrameSource {
    /// Human-readable origin (path, "scripted", ...)
    fn describe(&self) -> String;

    /// Decode the next frame
    ///
    /// Returns `Ok(None)` once the source has nothing left.
    ///
    /// # Errors
    /// Returns a decode error for a frame that exists but cannot be read
    fn read_frame(&mut self) -> Result<Option<DecodedFrame>, ContractError>;

    /// Total frame count, if the container reports one
    fn frame_count(&self) -> Option<u64>;

    /// Nominal frame rate, if known
    fn nominal_fps(&self) -> Option<f64>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn read_frame(&mut self) -> Result<Option<DecodedFrame>, ContractError> {
        (**self).read_frame()
    }

    fn frame_count(&self) -> Option<u64> {
        (**self).frame_count()
    }

    fn nominal_fps(&self) -> Option<f64> {
        (**self).nominal_fps()
    }
}

/// In-place frame preparation before the estimator call
pub trait FramePreprocessor {
    /// Name (used for logging)
    fn name(&self) -> &str;

    /// Transform the image in place
    fn process(&mut self, image: &mut ImageData) -> Result<(), ContractError>;
}
