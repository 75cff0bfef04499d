//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 遥测 → 时间线 → 会话 → 估计器 的端到端场景
//! - 磁盘帧序列 + 遮罩 + 轨迹导出

#[cfg(test)]
mod contract_tests {
    use contracts::{EndReason, GripperRegion, PacingMode, PairingMode, SyncSessionConfig};

    #[test]
    fn test_contract_defaults() {
        let _ = contracts::ConfigVersion::V1;
        let config = SyncSessionConfig::default();
        assert_eq!(config.pacing, PacingMode::RealTime);
        assert_eq!(config.pairing.mode, PairingMode::Auto);
        assert_eq!(contracts::MaskSettings::default().gripper, GripperRegion::Carve);
        assert_eq!(contracts::SessionStats::default().end_reason, EndReason::Running);
    }
}

#[cfg(test)]
mod support {
    use std::path::Path;

    use contracts::{
        ContractError, Estimator, ImageData, InertialSample, TrackingResult, TrackingState,
    };

    /// Estimator that keeps every batch it receives
    #[derive(Default)]
    pub struct BatchCapture {
        pub frames: Vec<(f64, Vec<f64>)>,
    }

    impl BatchCapture {
        pub fn batch_sizes(&self) -> Vec<usize> {
            self.frames.iter().map(|(_, batch)| batch.len()).collect()
        }

        pub fn delivered(&self) -> Vec<f64> {
            self.frames.iter().flat_map(|(_, b)| b.iter().copied()).collect()
        }
    }

    impl Estimator for BatchCapture {
        fn name(&self) -> &str {
            "batch_capture"
        }

        fn track(
            &mut self,
            _image: &ImageData,
            timestamp: f64,
            imu: &[InertialSample],
        ) -> Result<TrackingResult, ContractError> {
            self.frames
                .push((timestamp, imu.iter().map(|s| s.timestamp).collect()));
            Ok(TrackingResult {
                frame_index: self.frames.len() as u64 - 1,
                timestamp,
                state: TrackingState::NotInitialized,
                pose: None,
                imu_samples: imu.len(),
            })
        }

        fn shutdown(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        fn save_trajectory(&self, _path: &Path) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// Telemetry document with matching accelerometer and gyroscope samples
    pub fn telemetry_doc(cts_ms: &[f64]) -> String {
        let samples = |value: &str| {
            cts_ms
                .iter()
                .map(|cts| format!(r#"{{"cts":{cts},"value":{value}}}"#))
                .collect::<Vec<_>>()
                .join(",")
        };
        format!(
            r#"{{"1":{{"streams":{{"ACCL":{{"samples":[{}]}},"GYRO":{{"samples":[{}]}}}}}},"frames/second":30.0}}"#,
            samples("[0.0,0.0,9.81]"),
            samples("[0.01,0.02,0.03]")
        )
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use contracts::{EndOfStreamPolicy, EndReason, PacingMode, SyncSessionConfig};
    use estimator::RecordingEstimator;
    use ingestion::{ScriptedFrameSource, TelemetryParser};
    use sync_engine::{pacer_for, InertialTimeline, NoPacing, SyncDriver, SyncSession};

    use crate::support::{telemetry_doc, BatchCapture};

    fn timeline_from(doc: &str) -> InertialTimeline {
        let telemetry = TelemetryParser::new().parse_str(doc).unwrap();
        InertialTimeline::from_telemetry(&telemetry, &Default::default()).unwrap()
    }

    fn driver(timeline: InertialTimeline, config: &SyncSessionConfig, expected: Option<u64>) -> SyncDriver {
        let session = SyncSession::new(timeline, config, expected);
        SyncDriver::new(session, Box::new(NoPacing))
    }

    /// 遥测 → 时间线 → 会话 → 估计器
    ///
    /// accel cts = {0,10,20,30} ms, frames at 0 / 15 / 25 ms
    #[test]
    fn test_e2e_reference_scenario() {
        let timeline = timeline_from(&telemetry_doc(&[0.0, 10.0, 20.0, 30.0]));
        let mut source = ScriptedFrameSource::new([0.0, 15.0, 25.0], 8, 8);
        let mut estimator = BatchCapture::default();

        let summary = driver(timeline, &SyncSessionConfig::default(), None)
            .run(&mut source, &mut estimator)
            .unwrap();

        assert_eq!(estimator.frames[0].1, Vec::<f64>::new());
        assert_eq!(estimator.frames[1].1, vec![0.000, 0.010]);
        assert_eq!(estimator.frames[2].1, vec![0.020]);
        assert_eq!(summary.stats.end_reason, EndReason::SourceExhausted);
        assert_eq!(summary.stats.samples_remaining(), 1);
    }

    /// Normalized accelerometer timestamps start at zero
    #[test]
    fn test_e2e_timeline_is_zero_based() {
        let timeline = timeline_from(&telemetry_doc(&[1500.0, 1510.0, 1520.0]));
        assert_eq!(timeline.timestamp(0), Some(0.0));
        let ts: Vec<f64> = timeline.samples().iter().map(|s| s.timestamp).collect();
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Missing ACCL ⇒ degraded run with empty batches
    #[test]
    fn test_e2e_missing_accelerometer_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        std::fs::write(
            &path,
            r#"{"1":{"streams":{"GYRO":{"samples":[{"cts":0.0,"value":[0,0,0]}]}}}}"#,
        )
        .unwrap();

        let err = TelemetryParser::new().load_from_path(&path).unwrap_err();
        assert!(err.is_degradable());

        let mut source = ScriptedFrameSource::new([0.0, 33.0, 66.0], 4, 4);
        let mut estimator = BatchCapture::default();
        let summary = driver(InertialTimeline::empty(), &SyncSessionConfig::default(), None)
            .run(&mut source, &mut estimator)
            .unwrap();

        assert_eq!(estimator.batch_sizes(), vec![0, 0, 0]);
        assert_eq!(summary.stats.frames_processed, 3);
    }

    /// Post-loop reset [0, 33, 66, 5] ms ends the run after three frames
    #[test]
    fn test_e2e_timestamp_regression_ends_run() {
        let timeline = timeline_from(&telemetry_doc(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0]));
        let mut source = ScriptedFrameSource::new([0.0, 33.0, 66.0, 5.0, 99.0], 4, 4);
        let mut estimator = BatchCapture::default();

        let summary = driver(timeline, &SyncSessionConfig::default(), None)
            .run(&mut source, &mut estimator)
            .unwrap();

        assert_eq!(estimator.frames.len(), 3);
        assert_eq!(summary.stats.end_reason, EndReason::TimestampRegression);
        // the regressing frame is read but never delivered
        assert_eq!(source.remaining(), 1);
    }

    /// Frame-count policy stops at the reported total
    #[test]
    fn test_e2e_frame_count_policy() {
        let timeline = timeline_from(&telemetry_doc(&[0.0, 10.0, 20.0]));
        let config = SyncSessionConfig {
            end_of_stream: EndOfStreamPolicy::FrameCount,
            ..Default::default()
        };
        let mut source = ScriptedFrameSource::new([0.0, 33.0, 66.0], 4, 4).with_frame_count(2);
        let mut estimator = RecordingEstimator::new();

        let summary = driver(timeline, &config, Some(2))
            .run(&mut source, &mut estimator)
            .unwrap();

        assert_eq!(estimator.frames_tracked(), 2);
        assert_eq!(summary.stats.end_reason, EndReason::FrameCountReached);
    }

    /// Every sample is delivered exactly once when frames outlast the timeline
    #[test]
    fn test_e2e_partition_and_idempotence() {
        let cts: Vec<f64> = (0..200).map(|i| i as f64 * 5.0).collect();
        let doc = telemetry_doc(&cts);

        let run = || {
            let mut source = ScriptedFrameSource::regular(40, 30.0, 4, 4);
            let mut estimator = BatchCapture::default();
            driver(timeline_from(&doc), &SyncSessionConfig::default(), None)
                .run(&mut source, &mut estimator)
                .unwrap();
            estimator
        };

        let first = run();
        let second = run();

        let expected: Vec<f64> = cts.iter().map(|c| c * 1e-3).collect();
        assert_eq!(first.delivered(), expected);
        assert_eq!(first.frames, second.frames);
    }

    /// Stop flag set from another task ends a real-time run early
    #[tokio::test]
    async fn test_e2e_stop_flag_from_async_task() {
        let timeline = timeline_from(&telemetry_doc(&[0.0, 10.0, 20.0]));
        let mut source = ScriptedFrameSource::regular(10_000, 100.0, 2, 2);
        let session = SyncSession::new(timeline, &SyncSessionConfig::default(), None);
        let pacer = pacer_for(PacingMode::RealTime, Some(100.0));
        let mut driver = SyncDriver::new(session, pacer);
        let stop = driver.stop_handle();

        let task = tokio::task::spawn_blocking(move || {
            let mut estimator = RecordingEstimator::new();
            let summary = driver.run(&mut source, &mut estimator);
            (summary, estimator.frames_tracked())
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.store(true, Ordering::SeqCst);

        let (summary, tracked) = task.await.unwrap();
        let summary = summary.unwrap();
        assert_eq!(summary.stats.end_reason, EndReason::Stopped);
        assert!(tracked > 0 && tracked < 10_000);
    }
}

#[cfg(test)]
mod pipeline_tests {
    use compositor::FramePreparer;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{EndReason, Estimator, FrameSource};
    use estimator::{RecordingEstimator, TRAJECTORY_HEADER};
    use image::{Luma, Rgb, RgbImage};
    use ingestion::{ImageSequenceSource, TelemetryParser};
    use sync_engine::{pacer_for, InertialTimeline, SyncDriver, SyncSession};

    use crate::support::telemetry_doc;

    /// 配置 → 磁盘帧序列 → 遮罩 → 估计器 → 轨迹 CSV
    #[test]
    fn test_settings_driven_run_with_mask_and_trajectory() {
        let dir = tempfile::tempdir().unwrap();

        // frames: 4 solid RGB images at 64x36
        let frames = dir.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        for i in 0..4 {
            RgbImage::from_pixel(64, 36, Rgb([120, 130, 140]))
                .save(frames.join(format!("frame_{i:04}.png")))
                .unwrap();
        }

        // mask: left column occluded
        let mask_path = dir.path().join("mask.png");
        let mut mask = image::GrayImage::new(32, 18);
        for y in 0..18 {
            mask.put_pixel(0, y, Luma([255]));
        }
        mask.save(&mask_path).unwrap();

        let telemetry_path = dir.path().join("telemetry.json");
        let cts: Vec<f64> = (0..20).map(|i| i as f64 * 10.0).collect();
        std::fs::write(&telemetry_path, telemetry_doc(&cts)).unwrap();

        let settings_toml = format!(
            r#"
[camera]
width = 32
height = 18

[sync]
pacing = "none"

[mask]
image_path = "{}"
gripper = "blank"
"#,
            mask_path.display()
        );
        let settings = ConfigLoader::load_from_str(&settings_toml, ConfigFormat::Toml).unwrap();

        let telemetry = TelemetryParser::with_device(settings.telemetry_device())
            .load_from_path(&telemetry_path)
            .unwrap();
        let fps = telemetry.reported_fps.unwrap();
        let timeline = InertialTimeline::from_telemetry(&telemetry, &settings.sync.pairing).unwrap();

        let mut source = ImageSequenceSource::open(&frames, fps).unwrap();
        let config = settings.to_sync_session_config();
        let session = SyncSession::new(timeline, &config, source.frame_count());
        let mut driver = SyncDriver::new(session, pacer_for(config.pacing, source.nominal_fps()))
            .with_preprocessor(Box::new(FramePreparer::from_settings(&settings).unwrap()));

        let mut estimator = RecordingEstimator::new();
        let summary = driver.run(&mut source, &mut estimator).unwrap();
        estimator.shutdown().unwrap();

        assert_eq!(summary.stats.frames_processed, 4);
        assert_eq!(summary.stats.end_reason, EndReason::SourceExhausted);
        // frames at 0, 33.3, 66.7, 100 ms over samples every 10 ms
        let sizes: Vec<usize> = estimator.results().iter().map(|r| r.imu_samples).collect();
        assert_eq!(sizes, vec![0, 4, 3, 4]);
        assert_eq!(summary.tracking.frames, 4);

        let trajectory = dir.path().join("out/trajectory.csv");
        estimator.save_trajectory(&trajectory).unwrap();
        let content = std::fs::read_to_string(&trajectory).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], TRAJECTORY_HEADER);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("0,0.000000,not_initialized,0,0,"));
    }

    #[test]
    fn test_unreadable_mask_is_fatal() {
        let settings = ConfigLoader::load_from_str(
            "[camera]\nwidth = 32\nheight = 18\n[mask]\nimage_path = \"/nonexistent/mask.png\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let err = FramePreparer::from_settings(&settings).unwrap_err();
        assert!(matches!(err, contracts::ContractError::MaskUnreadable { .. }));
        assert!(!err.is_degradable());
    }
}
