//! Accelerometer / gyroscope pairing
//!
//! Turns the two independently sorted telemetry streams into paired
//! inertial samples on the accelerometer time base.

use contracts::{ContractError, ImuTelemetry, InertialSample, PairingConfig, PairingMode};
use tracing::{debug, warn};

/// Pair the accelerometer and gyroscope streams
///
/// Gyroscope timestamps are re-based by `telemetry.time_origin` before
/// comparison. Samples carry accelerometer timestamps.
///
/// # Errors
/// `StreamMisalignment` when the selected mode cannot pair the streams
pub fn pair_streams(
    telemetry: &ImuTelemetry,
    config: &PairingConfig,
) -> Result<Vec<InertialSample>, ContractError> {
    let (used, result) = match config.mode {
        PairingMode::Strict => ("strict", pair_strict(telemetry, config.tolerance_s())),
        PairingMode::Nearest => ("nearest", pair_nearest(telemetry, config.tolerance_s())),
        PairingMode::Auto => match pair_strict(telemetry, config.tolerance_s()) {
            Ok(samples) => ("strict", Ok(samples)),
            Err(strict_err) => {
                warn!(error = %strict_err, "strict pairing failed, falling back to nearest");
                ("nearest", pair_nearest(telemetry, config.tolerance_s()))
            }
        },
    };

    let outcome = if result.is_ok() { "ok" } else { "misaligned" };
    metrics::counter!(
        "gopro_syncer_pairing_total",
        "mode" => used,
        "outcome" => outcome
    )
    .increment(1);

    result
}

/// Equal counts, and each gyro timestamp matches its accelerometer counterpart
fn pair_strict(
    telemetry: &ImuTelemetry,
    tolerance_s: f64,
) -> Result<Vec<InertialSample>, ContractError> {
    let accel = telemetry.accel.samples();
    let gyro = telemetry.gyro.samples();

    if accel.len() != gyro.len() {
        return Err(ContractError::stream_misalignment(
            accel.len(),
            gyro.len(),
            "sample counts differ",
        ));
    }

    accel
        .iter()
        .zip(gyro)
        .enumerate()
        .map(|(i, (&(t, a), &(gt, g)))| {
            let gap = (gt - telemetry.time_origin - t).abs();
            if gap > tolerance_s {
                Err(ContractError::stream_misalignment(
                    accel.len(),
                    gyro.len(),
                    format!("sample {i}: timestamps differ by {:.3} ms", gap * 1e3),
                ))
            } else {
                Ok(InertialSample::new(t, a, g))
            }
        })
        .collect()
}

/// Each accelerometer sample takes the nearest gyroscope sample
fn pair_nearest(
    telemetry: &ImuTelemetry,
    tolerance_s: f64,
) -> Result<Vec<InertialSample>, ContractError> {
    let accel = telemetry.accel.samples();
    let gyro = telemetry.gyro.samples();
    let origin = telemetry.time_origin;

    if gyro.is_empty() {
        return Err(ContractError::stream_misalignment(
            accel.len(),
            0,
            "gyroscope stream is empty",
        ));
    }

    let mut samples = Vec::with_capacity(accel.len());
    let mut j = 0usize;
    let mut max_gap = 0.0f64;

    for (i, &(t, a)) in accel.iter().enumerate() {
        // both streams are sorted, so the nearest index never moves back
        while j + 1 < gyro.len()
            && ((gyro[j + 1].0 - origin) - t).abs() <= ((gyro[j].0 - origin) - t).abs()
        {
            j += 1;
        }

        let gap = ((gyro[j].0 - origin) - t).abs();
        if gap > tolerance_s {
            return Err(ContractError::stream_misalignment(
                accel.len(),
                gyro.len(),
                format!(
                    "sample {i}: nearest gyroscope sample is {:.3} ms away",
                    gap * 1e3
                ),
            ));
        }
        max_gap = max_gap.max(gap);
        samples.push(InertialSample::new(t, a, gyro[j].1));
    }

    debug!(
        accel = accel.len(),
        gyro = gyro.len(),
        max_gap_ms = max_gap * 1e3,
        "nearest pairing complete"
    );
    Ok(samples)
}
