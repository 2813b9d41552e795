//! 领域层统一错误定义
//!
//! 覆盖门店/版本的存在性与归属校验、版本链并发冲突、持久化与命令队列，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型
///
/// `StoreNotFound` / `VersionNotFound` / `PermissionDenied` 的 Display 文本
/// 会原样写入结果回调的 `error` 字段。
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 存在性与归属 ---
    #[error("store not found")]
    StoreNotFound,
    #[error("store version not found")]
    VersionNotFound,
    #[error("user is not a store creator")]
    PermissionDenied,

    // --- 版本链/持久化 ---
    #[error("version chain conflict: {reason}")]
    Conflict { reason: String },
    #[error("persistence error: {reason}")]
    Persistence { reason: String },

    // --- 值校验与解析 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 命令队列 ---
    #[error("queue error: {reason}")]
    Queue { reason: String },
}

impl DomainError {
    pub fn conflict(reason: impl Into<String>) -> Self {
        DomainError::Conflict {
            reason: reason.into(),
        }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        DomainError::Persistence {
            reason: reason.into(),
        }
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            reason: reason.into(),
        }
    }

    pub fn queue(reason: impl Into<String>) -> Self {
        DomainError::Queue {
            reason: reason.into(),
        }
    }

    /// 是否为可重试的版本链冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ---- Cross-crate conversions for infrastructure convenience ----

/// Postgres 序列化失败
#[cfg(feature = "infra-sqlx")]
const SERIALIZATION_FAILURE: &str = "40001";
/// Postgres 死锁
#[cfg(feature = "infra-sqlx")]
const DEADLOCK_DETECTED: &str = "40P01";
/// 唯一约束冲突（并发写入同一版本号或第二个 current 行）
#[cfg(feature = "infra-sqlx")]
const UNIQUE_VIOLATION: &str = "23505";

#[cfg(feature = "infra-sqlx")]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if let Some(code) = db.code() {
                if matches!(
                    code.as_ref(),
                    SERIALIZATION_FAILURE | DEADLOCK_DETECTED | UNIQUE_VIOLATION
                ) {
                    return DomainError::conflict(db.message().to_string());
                }
            }
        }
        DomainError::persistence(err.to_string())
    }
}

#[cfg(feature = "infra-amqp")]
impl From<lapin::Error> for DomainError {
    fn from(err: lapin::Error) -> Self {
        DomainError::queue(err.to_string())
    }
}

impl From<std::num::ParseIntError> for DomainError {
    fn from(err: std::num::ParseIntError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
