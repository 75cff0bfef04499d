//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact，输出到 stderr)
//! - Prometheus 指标导出 (可选)
//! - SyncedPacket 指标收集与统计
//! - 估计器耗时统计 (均值/中位数)
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init_tracing, LogFormat, TracingConfig};
//!
//! init_tracing(&TracingConfig::new(LogFormat::Compact, 1, false))?;
//! observability::init_metrics(9000)?;
//!
//! if let SessionStep::Packet(packet) = session.push_frame(decoded) {
//!     // session 内部已调用 record_packet_metrics
//! }
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_clock_regression, record_end_of_stream, record_packet_metrics,
    record_samples_remaining, record_tracking, MetricsSummary, RunningStats, StatsSummary,
    SyncMetricsAggregator, TimingSummary, TrackingTimes,
};

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    Json,
    /// 人类可读格式
    Pretty,
    /// 紧凑单行格式
    #[default]
    Compact,
}

/// Tracing 配置
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// RUST_LOG 未设置时使用的过滤器
    pub default_filter: String,
    /// 忽略 RUST_LOG，只输出 warn 及以上
    pub quiet: bool,
}

impl TracingConfig {
    /// `verbose` counts `-v` flags: 0 = info, 1 = debug, 2+ = trace
    pub fn new(log_format: LogFormat, verbose: u8, quiet: bool) -> Self {
        Self {
            log_format,
            default_filter: default_level(verbose).to_string(),
            quiet,
        }
    }

    fn filter(&self) -> EnvFilter {
        if self.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new(LogFormat::default(), 0, false)
    }
}

/// Log level for a `-v` count
pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// 初始化 Tracing
///
/// 诊断信息写入 stderr，stdout 留给运行摘要和 JSON 输出。
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// 初始化 Prometheus 指标导出 (0.0.0.0:`port`)
///
/// 不初始化 Tracing。
pub fn init_metrics(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    crate::metrics::describe_metrics();
    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_level() {
        assert_eq!(default_level(0), "info");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(5), "trace");
    }

    #[test]
    fn default_config_is_compact_info() {
        let config = TracingConfig::default();
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.default_filter, "info");
        assert!(!config.quiet);
    }
}
