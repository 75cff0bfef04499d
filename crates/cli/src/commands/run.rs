//! `run` command implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{PacingMode, SettingsBlueprint};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(settings = %args.settings.display(), "Loading settings");

    // Validate input paths
    if !args.settings.exists() {
        return Err(CliError::settings_not_found(args.settings.display().to_string()).into());
    }
    if !args.video.is_dir() {
        return Err(CliError::input_not_found("Video frame directory", args.video.display().to_string()).into());
    }
    if !args.telemetry.exists() {
        // degraded run, the pipeline logs it
        warn!(telemetry = %args.telemetry.display(), "Telemetry file not found");
    }

    // Load and parse settings
    let mut settings = config_loader::ConfigLoader::load_from_path(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?;

    apply_overrides(&mut settings, args);
    config_loader::ConfigLoader::validate(&settings).context("Invalid command-line override")?;

    info!(
        width = settings.camera.width,
        height = settings.camera.height,
        fps = ?settings.camera.fps,
        end_of_stream = ?settings.sync.end_of_stream,
        pacing = ?settings.sync.pacing,
        pairing = ?settings.sync.pairing.mode,
        "Settings loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - settings are valid, exiting");
        print_settings_summary(&settings);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        settings,
        video_dir: args.video.clone(),
        telemetry_path: args.telemetry.clone(),
        trajectory_path: args.output.clone(),
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    // The sync loop is synchronous; run it off the runtime so the signal
    // handler stays responsive.
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = Arc::clone(&stop);
    let mut task = tokio::task::spawn_blocking(move || pipeline.run(worker_stop));

    info!("Starting pipeline...");

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping after the current frame...");
            stop.store(true, Ordering::SeqCst);
            task.await
        }
    };

    let stats = joined
        .context("Sync task panicked")?
        .context("Pipeline execution failed")?;

    info!(
        frames = stats.run.stats.frames_processed,
        samples = stats.run.stats.samples_consumed,
        end_reason = ?stats.run.stats.end_reason,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    info!("GoPro Syncer finished");
    Ok(())
}

/// Apply command-line overrides on top of the settings file
fn apply_overrides(settings: &mut SettingsBlueprint, args: &RunArgs) {
    if let Some(fps) = args.fps {
        info!(fps, "Overriding frame rate from CLI");
        settings.camera.fps = Some(fps);
    }
    if let Some(mask) = &args.mask {
        info!(mask = %mask.display(), "Overriding mask image from CLI");
        settings.mask.image_path = Some(mask.clone());
    }
    if args.no_pacing {
        settings.sync.pacing = PacingMode::None;
    }
    if let Some(interval) = args.report_interval {
        settings.report.interval_frames = interval;
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print settings summary for dry-run mode
fn print_settings_summary(settings: &SettingsBlueprint) {
    println!("\n=== Settings Summary ===\n");
    println!("Camera:");
    println!(
        "  Working resolution: {}x{}",
        settings.camera.width, settings.camera.height
    );
    match settings.camera.fps {
        Some(fps) => println!("  Frame rate: {fps}"),
        None => println!("  Frame rate: (from telemetry)"),
    }

    println!("\nSync:");
    println!("  End of stream: {:?}", settings.sync.end_of_stream);
    println!("  Pacing: {:?}", settings.sync.pacing);
    println!(
        "  Pairing: {:?} (tolerance {} ms)",
        settings.sync.pairing.mode, settings.sync.pairing.tolerance_ms
    );
    println!("  Telemetry device: {}", settings.telemetry_device());

    println!("\nMask:");
    match &settings.mask.image_path {
        Some(path) => println!("  Image: {}", path.display()),
        None => println!("  Image: (none)"),
    }
    println!("  Gripper region: {:?}", settings.mask.gripper);

    println!();
}
