//! 错误类型
//! Error types for the counting engine and its collaborators

use thiserror::Error;

/// 计数库结果类型
pub type Result<T> = std::result::Result<T, CounterError>;

/// 计数系统错误
///
/// 跟踪器与计数器在正常输入下不会失败,
/// 只有构造参数校验以及外部协作方 (检测源) 会产生错误。
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detection source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Detector failed on frame {frame}: {reason}")]
    DetectorFailure { frame: u64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CounterError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn detector<S: Into<String>>(frame: u64, reason: S) -> Self {
        Self::DetectorFailure {
            frame,
            reason: reason.into(),
        }
    }
}
