//! Pipeline orchestrator - coordinates all components.
//!
//! Telemetry → inertial timeline → sync session; video frames → frame
//! preparer → recording estimator. Runs synchronously; the caller moves it
//! onto a blocking thread and owns the stop flag.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use compositor::FramePreparer;
use contracts::{Estimator, FrameSource, ImuTelemetry, SettingsBlueprint};
use estimator::RecordingEstimator;
use ingestion::{ImageSequenceSource, TelemetryParser, DEFAULT_SEQUENCE_FPS};
use sync_engine::{pacer_for, InertialTimeline, SyncDriver, SyncSession};
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated settings, CLI overrides applied
    pub settings: SettingsBlueprint,

    /// Directory of decoded frames
    pub video_dir: PathBuf,

    /// Telemetry JSON document
    pub telemetry_path: PathBuf,

    /// Trajectory CSV output (None = no export)
    pub trajectory_path: Option<PathBuf>,

    /// Maximum number of frames to process (None = unlimited)
    pub max_frames: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Setting `stop` ends the run before the next frame; the trajectory is
    /// still exported.
    pub fn run(self, stop: Arc<AtomicBool>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let settings = &self.config.settings;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Telemetry (degrades to an empty timeline when unavailable)
        let telemetry = self.load_telemetry()?;
        let timeline = match &telemetry {
            Some(telemetry) => {
                InertialTimeline::from_telemetry(telemetry, &settings.sync.pairing)
                    .context("Failed to pair accelerometer and gyroscope streams")?
            }
            None => InertialTimeline::empty(),
        };

        // Video
        let fps = resolve_frame_rate(settings, telemetry.as_ref());
        let mut source = ImageSequenceSource::open(&self.config.video_dir, fps)
            .map_err(|e| e.into_contract("video"))
            .context("Failed to open video source")?;

        info!(
            source = %source.describe(),
            frames = ?source.frame_count(),
            fps,
            samples = timeline.len(),
            "Inputs ready"
        );

        // Frame preparation
        let preparer = FramePreparer::from_settings(settings).context("Failed to load occlusion mask")?;
        let (width, height) = preparer.resolution();
        info!(width, height, masking = preparer.is_masking(), "Frame preparer configured");

        // Sync session + driver
        let session_config = settings.to_sync_session_config();
        let session = SyncSession::new(timeline, &session_config, source.frame_count());
        let pacer = pacer_for(session_config.pacing, source.nominal_fps());
        let mut driver = SyncDriver::new(session, pacer)
            .with_preprocessor(Box::new(preparer))
            .with_max_frames(self.config.max_frames)
            .with_report_interval(settings.report.interval_frames)
            .with_stop_flag(stop);

        let mut estimator = RecordingEstimator::new();
        info!(estimator = estimator.name(), "Starting synchronization");

        let outcome = driver.run(&mut source, &mut estimator);

        // Shutdown and export even when the run failed part way
        info!("Shutting down estimator...");
        estimator.shutdown().context("Estimator shutdown failed")?;
        if let Some(path) = &self.config.trajectory_path {
            estimator
                .save_trajectory(path)
                .with_context(|| format!("Failed to export trajectory to {}", path.display()))?;
        }

        let run = outcome.context("Synchronization failed")?;
        let stats = PipelineStats {
            run,
            duration: start_time.elapsed(),
            video_frames: source.files().len(),
            video_fps: fps,
            telemetry_available: telemetry.is_some(),
            trajectory_path: self.config.trajectory_path.clone(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.throughput()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Parse the telemetry document
    ///
    /// An unavailable document is logged once and yields `None`.
    fn load_telemetry(&self) -> Result<Option<ImuTelemetry>> {
        let parser = TelemetryParser::with_device(self.config.settings.telemetry_device());
        match parser.load_from_path(&self.config.telemetry_path) {
            Ok(telemetry) => Ok(Some(telemetry)),
            Err(e) if e.is_degradable() => {
                warn!(
                    path = %self.config.telemetry_path.display(),
                    error = %e,
                    "Telemetry unavailable, frames will carry no inertial samples"
                );
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to load telemetry"),
        }
    }
}

/// Frame rate of the image sequence: `camera.fps`, then the telemetry's
/// `frames/second`, then `DEFAULT_SEQUENCE_FPS`
///
/// Never depends on the telemetry loading, so a vision-only run still starts.
fn resolve_frame_rate(settings: &SettingsBlueprint, telemetry: Option<&ImuTelemetry>) -> f64 {
    if let Some(fps) = settings.camera.fps {
        return fps;
    }
    if let Some(fps) = telemetry.and_then(|t| t.reported_fps) {
        info!(fps, "Frame rate taken from telemetry");
        return fps;
    }
    warn!(
        fps = DEFAULT_SEQUENCE_FPS,
        "No frame rate in settings or telemetry, using default"
    );
    DEFAULT_SEQUENCE_FPS
}
