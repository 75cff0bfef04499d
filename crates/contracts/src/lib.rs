//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Inertial timestamps are seconds (f64), zero-based on the first accelerometer sample
//! - Frame timestamps are seconds (f64), derived from the source's playback position
//! - Both clocks are assumed to share the same origin; no offset is estimated

mod blueprint;
mod error;
mod estimator;
mod frame;
mod frame_source;
mod inertial;
mod sync;
mod sync_session_config;
mod telemetry;

pub use blueprint::*;
pub use error::*;
pub use estimator::*;
pub use frame::*;
pub use frame_source::{FramePreprocessor, FrameSource};
pub use inertial::*;
pub use sync::*;
pub use sync_session_config::*;
pub use telemetry::*;

pub use nalgebra::{Isometry3, Vector3};
