//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// GoPro Syncer - visual-inertial frame synchronization for GoPro recordings
#[derive(Parser, Debug)]
#[command(
    name = "gopro-syncer",
    author,
    version,
    about = "GoPro visual-inertial frame synchronization",
    long_about = "Aligns decoded GoPro video frames with the camera's embedded inertial telemetry.\n\n\
                  Every frame is delivered to the estimator together with exactly the \n\
                  accelerometer/gyroscope samples recorded since the previous frame."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GOPRO_SYNCER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GOPRO_SYNCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run frame/inertial synchronization
    Run(RunArgs),

    /// Validate a settings file without running
    Validate(ValidateArgs),

    /// Inspect a telemetry document
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to settings file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "settings.toml",
        env = "GOPRO_SYNCER_SETTINGS"
    )]
    pub settings: PathBuf,

    /// Directory of decoded video frames (png/jpg, sorted by name)
    #[arg(long, env = "GOPRO_SYNCER_VIDEO")]
    pub video: PathBuf,

    /// Telemetry JSON document extracted from the recording
    #[arg(short, long, env = "GOPRO_SYNCER_TELEMETRY")]
    pub telemetry: PathBuf,

    /// Write the estimated trajectory to this CSV file
    #[arg(short, long, env = "GOPRO_SYNCER_TRAJECTORY")]
    pub output: Option<PathBuf>,

    /// Override the occlusion mask image from settings
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Override the video frame rate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Process frames as fast as possible
    #[arg(long)]
    pub no_pacing: bool,

    /// Maximum number of frames to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "GOPRO_SYNCER_MAX_FRAMES")]
    pub max_frames: u64,

    /// Frames between timing reports (overrides settings, 0 = disabled)
    #[arg(long)]
    pub report_interval: Option<u64>,

    /// Validate inputs and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "GOPRO_SYNCER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to settings file to validate
    #[arg(short, long, default_value = "settings.toml")]
    pub settings: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Telemetry JSON document
    #[arg(short, long)]
    pub telemetry: PathBuf,

    /// Settings file providing the device key and pairing mode
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Device key inside the document (overrides settings)
    #[arg(long)]
    pub device: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
