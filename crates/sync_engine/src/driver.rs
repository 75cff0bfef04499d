//! Sync driver
//!
//! Single-threaded main loop: read frame → session → preprocess →
//! estimator → pacer, until the video ends, a frame limit is reached or a
//! stop is requested.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use contracts::{
    ContractError, EndReason, Estimator, FramePreprocessor, FrameSource, SessionStats,
    SyncedPacket,
};
use observability::{MetricsSummary, SyncMetricsAggregator, TimingSummary};
use tracing::{info, instrument, warn};

use crate::pacing::Pacer;
use crate::session::{SessionStep, SyncSession};

/// Default number of frames between timing reports
pub const DEFAULT_REPORT_INTERVAL: u64 = 100;

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Session statistics
    pub stats: SessionStats,
    /// Estimator timing
    pub tracking: TimingSummary,
    /// Aggregated packet metrics
    pub metrics: MetricsSummary,
    /// Frames the estimator reported as lost
    pub lost_frames: u64,
}

/// Drives a `SyncSession` from a frame source into an estimator
pub struct SyncDriver {
    session: SyncSession,
    pacer: Box<dyn Pacer>,
    preprocessor: Option<Box<dyn FramePreprocessor + Send>>,
    max_frames: Option<u64>,
    report_interval: u64,
    stop: Arc<AtomicBool>,
    aggregator: SyncMetricsAggregator,
    lost_frames: u64,
}

impl std::fmt::Debug for SyncDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncDriver")
            .field("session", &self.session)
            .field("pacer", &self.pacer.name())
            .field(
                "preprocessor",
                &self.preprocessor.as_ref().map(|p| p.name().to_string()),
            )
            .field("max_frames", &self.max_frames)
            .field("report_interval", &self.report_interval)
            .finish()
    }
}

impl SyncDriver {
    pub fn new(session: SyncSession, pacer: Box<dyn Pacer>) -> Self {
        Self {
            session,
            pacer,
            preprocessor: None,
            max_frames: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
            stop: Arc::new(AtomicBool::new(false)),
            aggregator: SyncMetricsAggregator::new(),
            lost_frames: 0,
        }
    }

    /// Transform each frame before the estimator sees it
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn FramePreprocessor + Send>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Stop after `max_frames` packets
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Frames between timing reports (0 disables)
    pub fn with_report_interval(mut self, frames: u64) -> Self {
        self.report_interval = frames;
        self
    }

    /// Share an externally owned stop flag
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that stops the loop before the next frame when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    /// Run until the session ends
    ///
    /// # Errors
    /// Frame decode, preprocessing and estimator errors abort the run
    #[instrument(name = "sync_driver_run", skip_all, fields(source = %source.describe(), estimator = %estimator.name()))]
    pub fn run<S, E>(&mut self, source: &mut S, estimator: &mut E) -> Result<RunSummary, ContractError>
    where
        S: FrameSource + ?Sized,
        E: Estimator + ?Sized,
    {
        let video_fps = source.nominal_fps();

        while !self.session.is_finished() {
            if self.stop.load(Ordering::SeqCst) {
                warn!("stop requested");
                self.session.finish(EndReason::Stopped);
                break;
            }
            if self
                .max_frames
                .is_some_and(|max| self.session.stats().frames_processed >= max)
            {
                info!(max_frames = ?self.max_frames, "frame limit reached");
                self.session.finish(EndReason::FrameLimit);
                break;
            }

            let Some(decoded) = source.read_frame()? else {
                self.session.finish(EndReason::SourceExhausted);
                break;
            };

            match self.session.push_frame(decoded) {
                SessionStep::Packet(packet) => self.process(packet, estimator, video_fps)?,
                SessionStep::EndOfStream(_) => break,
            }
        }

        let summary = self.summary();
        info!(
            frames = summary.stats.frames_processed,
            samples = summary.stats.samples_consumed,
            remaining = summary.stats.samples_remaining(),
            end_reason = ?summary.stats.end_reason,
            "sync run finished"
        );
        Ok(summary)
    }

    fn process<E>(
        &mut self,
        packet: SyncedPacket,
        estimator: &mut E,
        video_fps: Option<f64>,
    ) -> Result<(), ContractError>
    where
        E: Estimator + ?Sized,
    {
        self.aggregator.update(&packet);
        let SyncedPacket { mut frame, batch } = packet;

        if let Some(preprocessor) = self.preprocessor.as_mut() {
            preprocessor.process(&mut frame.image)?;
        }

        let started = Instant::now();
        let result = estimator.track(&frame.image, frame.timestamp, &batch.samples)?;
        let elapsed = started.elapsed();
        let seconds = elapsed.as_secs_f64();

        self.aggregator.record_tracking(seconds);
        observability::record_tracking(estimator.name(), seconds, result.state);
        if result.is_lost() {
            self.lost_frames += 1;
        }

        let processed = self.session.stats().frames_processed;
        if self.report_interval > 0 && processed % self.report_interval == 0 {
            let tracking_fps = if seconds > 0.0 { 1.0 / seconds } else { f64::INFINITY };
            info!(
                frame = frame.index,
                timestamp = frame.timestamp,
                video_fps = ?video_fps,
                tracking_fps,
                "timing report"
            );
        }

        self.pacer.pace(elapsed);
        Ok(())
    }

    /// Summary of the run so far
    pub fn summary(&self) -> RunSummary {
        let metrics = self.aggregator.summary();
        RunSummary {
            stats: self.session.stats().clone(),
            tracking: metrics.tracking.clone(),
            metrics,
            lost_frames: self.lost_frames,
        }
    }
}
