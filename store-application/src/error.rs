use store_domain::error::DomainError;

/// 错误分类标签，供网关映射 HTTP 状态码、调度器决定回调文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    PermissionDenied,
    Conflict,
    Persistence,
    Delivery,
    Internal,
}

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("validation: {0}")]
    Validation(String),

    #[error("delivery: {0}")]
    Delivery(String),

    #[error("infra: {0}")]
    Infra(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(err) => match err {
                DomainError::StoreNotFound | DomainError::VersionNotFound => ErrorKind::NotFound,
                DomainError::PermissionDenied => ErrorKind::PermissionDenied,
                DomainError::Conflict { .. } => ErrorKind::Conflict,
                DomainError::Persistence { .. } => ErrorKind::Persistence,
                DomainError::InvalidValue { .. }
                | DomainError::Parse { .. }
                | DomainError::Serde { .. } => ErrorKind::Validation,
                DomainError::Queue { .. } => ErrorKind::Delivery,
                _ => ErrorKind::Internal,
            },
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Delivery(_) => ErrorKind::Delivery,
            AppError::Infra(_) => ErrorKind::Internal,
        }
    }

    /// 写入结果回调的错误文本；持久化与内部错误只给出通用文本
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Persistence | ErrorKind::Internal | ErrorKind::Delivery => {
                GENERIC_ERROR_TEXT.to_string()
            }
            _ => match self {
                AppError::Domain(err) => err.to_string(),
                AppError::Validation(reason) => reason.clone(),
                other => other.to_string(),
            },
        }
    }
}

pub const GENERIC_ERROR_TEXT: &str = "internal server error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_tagged() {
        assert_eq!(
            AppError::from(DomainError::StoreNotFound).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::from(DomainError::PermissionDenied).kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            AppError::from(DomainError::conflict("race")).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            AppError::from(DomainError::queue("down")).kind(),
            ErrorKind::Delivery
        );
        assert_eq!(AppError::Infra("boom".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn public_message_keeps_domain_text() {
        assert_eq!(
            AppError::from(DomainError::VersionNotFound).public_message(),
            "store version not found"
        );
        assert_eq!(
            AppError::Infra("pool exhausted".into()).public_message(),
            GENERIC_ERROR_TEXT
        );
    }

    #[test]
    fn persistence_details_stay_out_of_public_message() {
        let err = AppError::from(DomainError::persistence(
            "error returned from database: relation \"store_versions\" does not exist",
        ));
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(err.public_message(), GENERIC_ERROR_TEXT);
    }
}
