//! 错误定义模块

use thiserror::Error;

/// MediHub统一错误类型
#[derive(Error, Debug)]
pub enum MediHubError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 批量写入中至少一条记录被拒绝，携带第一条失败记录的消息
    #[error("验证错误: {0}")]
    Validation(String),

    /// 网络或远程存储错误
    #[error("传输错误: {0}")]
    Transport(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效的状态转换: 从 {from} 经 {event}")]
    InvalidStateTransition { from: String, event: String },

    #[error("系统内部错误: {0}")]
    Internal(String),
}

impl MediHubError {
    /// 面向页面展示的错误消息（不含分类前缀）
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Transport(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Serialization(e) => e.to_string(),
            Self::InvalidStateTransition { from, event } => {
                format!("cannot {} while {}", event, from)
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// MediHub统一结果类型
pub type Result<T> = std::result::Result<T, MediHubError>;
