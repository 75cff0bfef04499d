//! # Ingestion
//!
//! Sensor data ingestion module.
//!
//! Responsibilities:
//! - Parse camera telemetry into sorted, deduplicated inertial streams
//! - Provide video frames through the `FrameSource` contract
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{ImageSequenceSource, TelemetryParser};
//! use contracts::FrameSource;
//!
//! let telemetry = TelemetryParser::new().load_from_path("GX010001.json")?;
//! let mut video = ImageSequenceSource::open("frames/", 59.94)?;
//! while let Some(frame) = video.read_frame()? {
//!     // hand the frame to the sync session
//! }
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::ScriptedFrameSource;
//!
//! let source = ScriptedFrameSource::new([0.0, 33.3, 66.7, 0.0], 640, 480);
//! ```

mod error;
mod telemetry;
mod video;

// Re-exports
pub use error::{IngestionError, Result};
pub use telemetry::{TelemetryParser, DEFAULT_DEVICE};
pub use video::{ImageSequenceSource, ScriptedFrameSource, DEFAULT_SEQUENCE_FPS};
