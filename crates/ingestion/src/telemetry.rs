//! Telemetry parser
//!
//! 从相机遥测 JSON 文档中提取加速度计、陀螺仪、方向与 GPS 流。
//!
//! 文档结构:
//!
//! ```text
//! {
//!   "1": { "streams": {
//!       "ACCL": { "samples": [ { "cts": 12.5, "value": [ax, ay, az] }, ... ] },
//!       "GYRO": { "samples": [ { "cts": 12.5, "value": [gx, gy, gz] }, ... ] },
//!       "CORI": { "samples": [ { "cts": 16.7, "value": [...] }, ... ] },
//!       "GPS5": { "samples": [ { "cts": 18.0, "value": [...] }, ... ] }
//!   } },
//!   "frames/second": 59.94
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use contracts::{ContractError, ImuTelemetry, TelemetryStream, Vector3};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};

/// 时间戳单位换算 (毫秒 → 秒)
const MS_TO_S: f64 = 1e-3;

/// 默认设备键
pub const DEFAULT_DEVICE: &str = "1";

const ACCL: &str = "ACCL";
const GYRO: &str = "GYRO";
const CORI: &str = "CORI";
const GPS5: &str = "GPS5";
const FPS_KEY: &str = "frames/second";

#[derive(Debug, Deserialize)]
struct RawStream<S> {
    #[serde(default = "Vec::new")]
    samples: Vec<S>,
}

#[derive(Debug, Deserialize)]
struct RawVectorSample {
    cts: f64,
    value: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawStamp {
    cts: f64,
}

/// Telemetry document parser
#[derive(Debug, Clone)]
pub struct TelemetryParser {
    device: String,
}

impl Default for TelemetryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryParser {
    /// Parser reading device `"1"`
    pub fn new() -> Self {
        Self::with_device(DEFAULT_DEVICE)
    }

    /// Parser reading the given device key
    pub fn with_device(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Configured device key
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Load and parse a telemetry file
    ///
    /// # Errors
    /// Every failure maps to `ContractError::TelemetryUnavailable`
    #[instrument(name = "telemetry_load", skip(self), fields(path = %path.as_ref().display()))]
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> std::result::Result<ImuTelemetry, ContractError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let file = File::open(path).map_err(|source| {
            IngestionError::TelemetryOpen {
                path: origin.clone(),
                source,
            }
            .into_contract(&origin)
        })?;

        self.parse_reader(BufReader::new(file))
            .map_err(|e| e.into_contract(&origin))
    }

    /// Parse a telemetry document from a reader
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<ImuTelemetry> {
        let document: Map<String, Value> = serde_json::from_reader(reader)?;
        self.parse_document(document)
    }

    /// Parse a telemetry document from a string
    pub fn parse_str(&self, text: &str) -> Result<ImuTelemetry> {
        let document: Map<String, Value> = serde_json::from_str(text)?;
        self.parse_document(document)
    }

    fn parse_document(&self, mut document: Map<String, Value>) -> Result<ImuTelemetry> {
        let reported_fps = document
            .get(FPS_KEY)
            .and_then(Value::as_f64)
            .filter(|fps| fps.is_finite() && *fps > 0.0);

        let device = self.resolve_device(&document)?;
        let mut streams = match document.remove(&device) {
            Some(Value::Object(mut device_obj)) => match device_obj.remove("streams") {
                Some(Value::Object(streams)) => streams,
                _ => {
                    return Err(IngestionError::MissingStream {
                        what: format!("streams object in device '{device}'"),
                    });
                }
            },
            _ => {
                return Err(IngestionError::MissingStream {
                    what: format!("device '{device}'"),
                });
            }
        };

        let accel_raw = take_vector_stream(&mut streams, ACCL)?;
        let gyro_raw = take_vector_stream(&mut streams, GYRO)?;
        let orientation_timestamps = take_optional_stamps(&mut streams, CORI)?;
        let gps_timestamps = take_optional_stamps(&mut streams, GPS5)?;

        let accel_count = accel_raw.len();
        let gyro_count = gyro_raw.len();

        let accel = TelemetryStream::from_samples(ACCL, accel_raw);
        let gyro = TelemetryStream::from_samples(GYRO, gyro_raw);

        let time_origin = accel.first_timestamp().ok_or_else(|| IngestionError::EmptyStream {
            stream: ACCL.to_string(),
        })?;
        if gyro.is_empty() {
            warn!(device = %device, "GYRO stream has no samples");
        }

        let duplicates = (accel_count - accel.len()) + (gyro_count - gyro.len());
        if duplicates > 0 {
            debug!(duplicates, "replaced samples sharing a timestamp");
        }

        metrics::counter!("gopro_syncer_telemetry_samples_total", "stream" => ACCL)
            .increment(accel.len() as u64);
        metrics::counter!("gopro_syncer_telemetry_samples_total", "stream" => GYRO)
            .increment(gyro.len() as u64);

        info!(
            device = %device,
            accel = accel.len(),
            gyro = gyro.len(),
            cori = orientation_timestamps.len(),
            gps = gps_timestamps.len(),
            time_origin,
            "telemetry parsed"
        );

        Ok(ImuTelemetry {
            device,
            accel: accel.shifted(time_origin),
            gyro,
            time_origin,
            orientation_timestamps,
            gps_timestamps,
            reported_fps,
        })
    }

    /// Configured key, else the smallest integer key holding `streams`
    fn resolve_device(&self, document: &Map<String, Value>) -> Result<String> {
        if document.contains_key(&self.device) {
            return Ok(self.device.clone());
        }

        let fallback = document
            .iter()
            .filter(|(_, v)| v.get("streams").is_some_and(Value::is_object))
            .filter_map(|(k, _)| k.parse::<u64>().ok().map(|n| (n, k)))
            .min_by_key(|(n, _)| *n)
            .map(|(_, k)| k.clone());

        match fallback {
            Some(key) => {
                warn!(configured = %self.device, using = %key, "telemetry device not found, falling back");
                Ok(key)
            }
            None => Err(IngestionError::MissingStream {
                what: format!("device '{}'", self.device),
            }),
        }
    }
}

fn take_vector_stream(
    streams: &mut Map<String, Value>,
    name: &str,
) -> Result<Vec<(f64, Vector3<f64>)>> {
    let value = streams.remove(name).ok_or_else(|| IngestionError::MissingStream {
        what: format!("{name} stream"),
    })?;
    let raw: RawStream<RawVectorSample> = serde_json::from_value(value)?;

    raw.samples
        .into_iter()
        .enumerate()
        .map(|(index, sample)| {
            let timestamp = checked_seconds(name, index, sample.cts)?;
            match sample.value.as_slice() {
                [x, y, z, ..] => Ok((timestamp, Vector3::new(*x, *y, *z))),
                other => Err(IngestionError::BadSample {
                    stream: name.to_string(),
                    index,
                    message: format!("expected 3 components, got {}", other.len()),
                }),
            }
        })
        .collect()
}

fn take_optional_stamps(streams: &mut Map<String, Value>, name: &str) -> Result<Vec<f64>> {
    let Some(value) = streams.remove(name) else {
        debug!(stream = name, "optional stream absent");
        return Ok(Vec::new());
    };
    let raw: RawStream<RawStamp> = serde_json::from_value(value)?;

    raw.samples
        .into_iter()
        .enumerate()
        .map(|(index, sample)| checked_seconds(name, index, sample.cts))
        .collect()
}

fn checked_seconds(stream: &str, index: usize, cts: f64) -> Result<f64> {
    if cts.is_finite() {
        Ok(cts * MS_TO_S)
    } else {
        Err(IngestionError::BadSample {
            stream: stream.to_string(),
            index,
            message: format!("non-finite timestamp {cts}"),
        })
    }
}
