//! Pipeline statistics and metrics.

use std::path::PathBuf;
use std::time::Duration;

use sync_engine::RunSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Driver summary (session stats, timing, packet metrics)
    pub run: RunSummary,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Frames available in the video source
    pub video_frames: usize,

    /// Frame rate used for playback positions
    pub video_fps: f64,

    /// Whether inertial telemetry was loaded
    pub telemetry_available: bool,

    /// Trajectory CSV written, if any
    pub trajectory_path: Option<PathBuf>,
}

impl PipelineStats {
    /// Frames processed per wall-clock second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.run.stats.frames_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let stats = &self.run.stats;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Synchronization Summary                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!(
            "   ├─ Frames processed: {} / {}",
            stats.frames_processed, self.video_frames
        );
        println!("   ├─ Video fps: {:.3}", self.video_fps);
        println!("   ├─ Throughput: {:.2} frames/s", self.throughput());
        println!("   └─ End reason: {:?}", stats.end_reason);

        println!("\n📈 Inertial Samples");
        if self.telemetry_available {
            println!("   ├─ Timeline: {}", stats.timeline_len);
            println!("   ├─ Delivered: {}", stats.samples_consumed);
            println!("   ├─ Never delivered: {}", stats.samples_remaining());
            println!(
                "   ├─ Empty batches: {} ({:.2}%)",
                self.run.metrics.empty_batches, self.run.metrics.empty_rate
            );
            println!("   ├─ Batch size: {}", self.run.metrics.batch_size);
            println!("   └─ Clock regressions: {}", stats.clock_regressions);
        } else {
            println!("   └─ Telemetry unavailable: frames carried no samples");
        }

        println!("\n⏱  Estimator");
        print!("{}", indent(&self.run.tracking.to_string()));
        println!("   └─ Lost frames: {}", self.run.lost_frames);

        if let Some(path) = &self.trajectory_path {
            println!("\n📤 Trajectory: {}", path.display());
        }

        println!();
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("   ├─ {line}\n")).collect()
}
