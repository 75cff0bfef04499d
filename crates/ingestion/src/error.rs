//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 遥测文件无法打开
    #[error("cannot open telemetry '{path}': {source}")]
    TelemetryOpen {
        /// 文件路径
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 遥测 JSON 解析失败
    #[error("malformed telemetry JSON: {0}")]
    TelemetryJson(#[from] serde_json::Error),

    /// 缺少设备或必需的流
    #[error("missing {what}")]
    MissingStream {
        /// 缺失内容描述
        what: String,
    },

    /// 必需的流没有样本
    #[error("stream {stream} has no samples")]
    EmptyStream {
        /// 流名称
        stream: String,
    },

    /// 样本格式错误
    #[error("stream {stream} sample {index}: {message}")]
    BadSample {
        /// 流名称
        stream: String,
        /// 样本序号 (文档顺序)
        index: usize,
        /// 错误消息
        message: String,
    },

    /// 视频源无法打开
    #[error("cannot open video '{path}': {message}")]
    VideoOpen {
        /// 路径
        path: String,
        /// 错误消息
        message: String,
    },

    /// 单帧解码失败
    #[error("frame {index} ({path}): {message}")]
    FrameDecode {
        /// 帧序号
        index: u64,
        /// 帧文件路径
        path: String,
        /// 错误消息
        message: String,
    },
}

impl IngestionError {
    /// Convert into a contract error, tagging telemetry failures with `origin`
    pub fn into_contract(self, origin: &str) -> ContractError {
        match self {
            IngestionError::VideoOpen { path, message } => {
                ContractError::video_unopenable(path, message)
            }
            IngestionError::FrameDecode {
                index,
                path,
                message,
            } => ContractError::FrameDecode {
                index,
                message: format!("{path}: {message}"),
            },
            other => ContractError::telemetry_unavailable(origin, other.to_string()),
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        err.into_contract("telemetry")
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
