//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{PairingConfig, StreamSummary, TelemetrySummary};
use ingestion::TelemetryParser;
use serde::Serialize;
use sync_engine::InertialTimeline;
use tracing::info;

use crate::cli::InfoArgs;

/// Telemetry info for JSON output
#[derive(Serialize)]
struct TelemetryInfo {
    path: String,
    #[serde(flatten)]
    summary: TelemetrySummary,
    pairing: PairingInfo,
}

#[derive(Serialize)]
struct PairingInfo {
    mode: String,
    tolerance_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(telemetry = %args.telemetry.display(), "Loading telemetry info");

    if !args.telemetry.exists() {
        anyhow::bail!("Telemetry file not found: {}", args.telemetry.display());
    }

    let settings = args
        .settings
        .as_ref()
        .map(|path| {
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        })
        .transpose()?;

    let device = args
        .device
        .clone()
        .or_else(|| settings.as_ref().map(|s| s.telemetry_device().to_string()))
        .unwrap_or_else(|| ingestion::DEFAULT_DEVICE.to_string());
    let pairing = settings
        .as_ref()
        .map(|s| s.sync.pairing)
        .unwrap_or_default();

    let telemetry = TelemetryParser::with_device(device)
        .load_from_path(&args.telemetry)
        .with_context(|| format!("Failed to load telemetry from {}", args.telemetry.display()))?;

    let pairing_info = pairing_info(
        &pairing,
        InertialTimeline::from_telemetry(&telemetry, &pairing).map_err(|e| e.to_string()),
    );
    let info = TelemetryInfo {
        path: args.telemetry.display().to_string(),
        summary: telemetry.summary(),
        pairing: pairing_info,
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize telemetry info")?;
        println!("{}", json);
    } else {
        print_telemetry_info(&info);
    }

    Ok(())
}

fn pairing_info(
    pairing: &PairingConfig,
    timeline: std::result::Result<InertialTimeline, String>,
) -> PairingInfo {
    let (samples, duration_s, error) = match timeline {
        Ok(timeline) => (Some(timeline.len()), Some(timeline.duration()), None),
        Err(e) => (None, None, Some(e)),
    };
    PairingInfo {
        mode: format!("{:?}", pairing.mode),
        tolerance_ms: pairing.tolerance_ms,
        samples,
        duration_s,
        error,
    }
}

fn format_stream(stream: &StreamSummary) -> String {
    match (stream.first, stream.last) {
        (Some(first), Some(last)) => format!(
            "{} samples, {:.3}s → {:.3}s, {}",
            stream.samples,
            first,
            last,
            stream
                .rate_hz
                .map_or_else(|| "rate N/A".to_string(), |hz| format!("{hz:.1} Hz"))
        ),
        _ => "absent".to_string(),
    }
}

fn print_telemetry_info(info: &TelemetryInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    GoPro Telemetry                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let summary = &info.summary;
    println!("📍 Document");
    println!("   ├─ Path: {}", info.path);
    println!("   ├─ Device: {}", summary.device);
    println!("   ├─ Time origin: {:.6}s", summary.time_origin);
    match summary.reported_fps {
        Some(fps) => println!("   └─ Reported fps: {}", fps),
        None => println!("   └─ Reported fps: (none)"),
    }

    println!("\n📡 Streams ({})", summary.streams.len());
    for (i, stream) in summary.streams.iter().enumerate() {
        let prefix = if i + 1 == summary.streams.len() { "└─" } else { "├─" };
        println!("   {} {}: {}", prefix, stream.name, format_stream(stream));
    }

    let pairing = &info.pairing;
    println!("\n⚙️  Pairing");
    println!(
        "   ├─ Mode: {} (tolerance {} ms)",
        pairing.mode, pairing.tolerance_ms
    );
    match (&pairing.samples, &pairing.error) {
        (Some(samples), _) => println!(
            "   └─ Timeline: {} samples over {:.3}s",
            samples,
            pairing.duration_s.unwrap_or_default()
        ),
        (None, Some(error)) => println!("   └─ Failed: {}", error),
        (None, None) => println!("   └─ Timeline: N/A"),
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_formatting() {
        let stream = StreamSummary::from_timestamps("ACCL", [0.0, 0.5, 1.0].into_iter());
        assert_eq!(format_stream(&stream), "3 samples, 0.000s → 1.000s, 2.0 Hz");
        let empty = StreamSummary::from_timestamps("GPS5", std::iter::empty());
        assert_eq!(format_stream(&empty), "absent");
    }

    #[test]
    fn pairing_failure_is_reported() {
        let info = pairing_info(&PairingConfig::default(), Err("gap".to_string()));
        assert_eq!(info.mode, "Auto");
        assert_eq!(info.error.as_deref(), Some("gap"));
        assert!(info.samples.is_none());
    }

    #[test]
    fn info_on_telemetry_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        std::fs::write(
            &path,
            r#"{"1":{"streams":{
                "ACCL":{"samples":[{"cts":0.0,"value":[1,2,3]},{"cts":10.0,"value":[1,2,3]}]},
                "GYRO":{"samples":[{"cts":0.0,"value":[0,0,0]},{"cts":10.0,"value":[0,0,0]}]}
            }}}"#,
        )
        .unwrap();

        let args = InfoArgs {
            telemetry: path,
            settings: None,
            device: None,
            json: true,
        };
        assert!(run_info(&args).is_ok());
    }
}
