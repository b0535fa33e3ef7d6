//! 错误定义模块

use thiserror::Error;

/// 分诊系统统一错误类型
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("远程存储错误: {0}")]
    Store(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("标识冲突: {0}")]
    Conflict(String),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 分诊系统统一结果类型
pub type Result<T> = std::result::Result<T, TriageError>;
