//! Sync session 指标收集模块
//!
//! 基于 SyncedPacket 与估计器耗时收集和统计运行指标。

use contracts::{EndReason, SyncedPacket, TrackingState};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// 注册指标描述 (Prometheus HELP 文本)
pub fn describe_metrics() {
    describe_counter!("gopro_syncer_frames_total", "Frames turned into synced packets");
    describe_counter!(
        "gopro_syncer_imu_samples_total",
        "Inertial samples delivered to the estimator"
    );
    describe_counter!(
        "gopro_syncer_empty_batches_total",
        "Frames delivered with an empty inertial batch"
    );
    describe_counter!(
        "gopro_syncer_clock_regressions_total",
        "Frame timestamps lower than their predecessor"
    );
    describe_counter!("gopro_syncer_sessions_ended_total", "Sync sessions ended, by reason");
    describe_counter!(
        "gopro_syncer_tracking_results_total",
        "Estimator results, by tracking state"
    );
    describe_gauge!(
        "gopro_syncer_last_frame_timestamp_s",
        Unit::Seconds,
        "Timestamp of the last synced frame"
    );
    describe_gauge!(
        "gopro_syncer_imu_samples_remaining",
        "Inertial samples not yet consumed"
    );
    describe_histogram!("gopro_syncer_batch_size", "Inertial samples per frame");
    describe_histogram!(
        "gopro_syncer_tracking_time_ms",
        Unit::Milliseconds,
        "Estimator time per frame"
    );
}

/// 从 SyncedPacket 记录指标
///
/// 每次产生 SyncedPacket 时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_packet_metrics;
///
/// if let SessionStep::Packet(packet) = session.push_frame(decoded) {
///     record_packet_metrics(&packet);
/// }
/// ```
pub fn record_packet_metrics(packet: &SyncedPacket) {
    // 帧计数器
    counter!("gopro_syncer_frames_total").increment(1);

    // 帧时间戳
    gauge!("gopro_syncer_last_frame_timestamp_s").set(packet.frame.timestamp);

    // 批次大小
    let samples = packet.batch.len();
    histogram!("gopro_syncer_batch_size").record(samples as f64);
    counter!("gopro_syncer_imu_samples_total").increment(samples as u64);

    if samples == 0 {
        counter!("gopro_syncer_empty_batches_total").increment(1);
    }
}

/// 记录时钟回退 (视频结束或解码器异常)
pub fn record_clock_regression() {
    counter!("gopro_syncer_clock_regressions_total").increment(1);
}

/// 记录会话结束原因
pub fn record_end_of_stream(reason: EndReason) {
    counter!(
        "gopro_syncer_sessions_ended_total",
        "reason" => format!("{reason:?}")
    )
    .increment(1);
}

/// 记录估计器单帧耗时
pub fn record_tracking(estimator: &str, seconds: f64, state: TrackingState) {
    histogram!(
        "gopro_syncer_tracking_time_ms",
        "estimator" => estimator.to_string()
    )
    .record(seconds * 1000.0);

    counter!(
        "gopro_syncer_tracking_results_total",
        "estimator" => estimator.to_string(),
        "state" => state.as_str()
    )
    .increment(1);
}

/// 记录剩余未消费的惯性采样数
pub fn record_samples_remaining(remaining: usize) {
    gauge!("gopro_syncer_imu_samples_remaining").set(remaining as f64);
}

/// 同步指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SyncMetricsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 惯性采样总数
    pub total_samples: u64,

    /// 空批次帧数
    pub empty_batches: u64,

    /// 批次大小统计
    pub batch_stats: RunningStats,

    /// 帧间隔统计 (毫秒)
    pub interval_stats: RunningStats,

    /// 估计器耗时
    pub tracking: TrackingTimes,
}

impl SyncMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, packet: &SyncedPacket) {
        self.total_frames += 1;
        let samples = packet.batch.len();
        self.total_samples += samples as u64;
        if samples == 0 {
            self.empty_batches += 1;
        }
        self.batch_stats.push(samples as f64);

        // 首帧的 window_start 为哨兵值
        if packet.batch.window_start >= 0.0 {
            let interval = packet.batch.window_end - packet.batch.window_start;
            self.interval_stats.push(interval * 1000.0);
        }
    }

    /// 记录一次估计器调用耗时 (秒)
    pub fn record_tracking(&mut self, seconds: f64) {
        self.tracking.push(seconds);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            total_samples: self.total_samples,
            empty_batches: self.empty_batches,
            empty_rate: if self.total_frames > 0 {
                self.empty_batches as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_stats),
            frame_interval_ms: StatsSummary::from(&self.interval_stats),
            tracking: self.tracking.summary(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub total_samples: u64,
    pub empty_batches: u64,
    pub empty_rate: f64,
    pub batch_size: StatsSummary,
    pub frame_interval_ms: StatsSummary,
    pub tracking: TimingSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Metrics Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(f, "IMU samples: {}", self.total_samples)?;
        writeln!(
            f,
            "Empty batches: {} ({:.2}%)",
            self.empty_batches, self.empty_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "Frame interval (ms): {}", self.frame_interval_ms)?;
        write!(f, "{}", self.tracking)
    }
}

/// 估计器耗时记录
///
/// 保留所有样本以计算中位数。
#[derive(Debug, Clone, Default)]
pub struct TrackingTimes {
    samples: Vec<f64>,
}

impl TrackingTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一次耗时 (秒)
    pub fn push(&mut self, seconds: f64) {
        self.samples.push(seconds);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 最近一次耗时
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    /// 平均耗时
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
        }
    }

    /// 中位数耗时 (排序后第 n/2 个)
    pub fn median(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        Some(sorted[sorted.len() / 2])
    }

    /// 生成耗时摘要
    pub fn summary(&self) -> TimingSummary {
        TimingSummary {
            frames: self.samples.len() as u64,
            mean_s: self.mean(),
            median_s: self.median(),
            total_s: self.samples.iter().sum(),
        }
    }
}

/// 估计器耗时摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingSummary {
    pub frames: u64,
    pub mean_s: Option<f64>,
    pub median_s: Option<f64>,
    pub total_s: f64,
}

impl std::fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.median_s, self.mean_s) {
            (Some(median), Some(mean)) => {
                writeln!(f, "median tracking time: {median:.6} s")?;
                writeln!(f, "mean tracking time: {mean:.6} s (n={})", self.frames)
            }
            _ => writeln!(f, "tracking time: N/A (no frames tracked)"),
        }
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
