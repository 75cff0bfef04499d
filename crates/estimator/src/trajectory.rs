//! Trajectory CSV export
//!
//! One row per tracked frame. Pose columns are left empty for frames
//! without a pose.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use contracts::TrackingResult;
use tracing::{debug, info};

use crate::error::EstimatorError;

/// CSV header line
pub const TRAJECTORY_HEADER: &str = "frame_idx,timestamp,state,is_lost,imu_samples,x,y,z,q_x,q_y,q_z,q_w";

/// Format one result as a CSV row (no trailing newline)
pub fn trajectory_row(result: &TrackingResult) -> String {
    let pose = match &result.pose {
        Some(pose) => {
            let t = &pose.translation.vector;
            let q = pose.rotation.quaternion();
            format!(
                "{:.9},{:.9},{:.9},{:.9},{:.9},{:.9},{:.9}",
                t.x, t.y, t.z, q.i, q.j, q.k, q.w
            )
        }
        None => ",,,,,,".to_string(),
    };

    format!(
        "{},{:.6},{},{},{},{}",
        result.frame_index,
        result.timestamp,
        result.state.as_str(),
        u8::from(result.is_lost()),
        result.imu_samples,
        pose
    )
}

/// Write `results` to `writer` as CSV, header first
pub fn write_trajectory_to<W: Write>(writer: &mut W, results: &[TrackingResult]) -> io::Result<()> {
    writeln!(writer, "{TRAJECTORY_HEADER}")?;
    for result in results {
        writeln!(writer, "{}", trajectory_row(result))?;
    }
    writer.flush()
}

/// Write `results` to a CSV file, creating parent directories
///
/// # Errors
/// `EstimatorError::Export` on any IO failure
pub fn write_trajectory(path: &Path, results: &[TrackingResult]) -> Result<(), EstimatorError> {
    let export_err = |source| EstimatorError::Export {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_err)?;
        debug!(dir = %parent.display(), "trajectory directory ready");
    }

    let file = File::create(path).map_err(export_err)?;
    let mut writer = BufWriter::new(file);
    write_trajectory_to(&mut writer, results).map_err(export_err)?;

    info!(path = %path.display(), rows = results.len(), "trajectory written");
    Ok(())
}
