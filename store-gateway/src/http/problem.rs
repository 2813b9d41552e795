use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use store_application::error::{AppError, ErrorKind};

use super::response::{ERROR, JsonResult};
use crate::auth::AuthError;
use crate::validation::ValidationErrors;

pub const PUBLISH_FAILED: &str = "Failed to publish a message";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const INVALID_ARGUMENT: &str = "Invalid argument passed";

pub type ApiResult<T> = Result<T, ApiProblem>;

/// 失败响应：`{"message": "Error", "body": ...}`
#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    body: Value,
}

impl ApiProblem {
    pub fn from_app(error: AppError) -> Self {
        let status = match error.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Persistence | ErrorKind::Internal => {
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR);
            }
            ErrorKind::Delivery => {
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, PUBLISH_FAILED);
            }
        };
        Self::new(status, error.public_message())
    }

    /// 令牌缺失或校验失败
    pub fn unauthorized(error: AuthError) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error.to_string())
    }

    /// 登录失败：用户不存在或密码错误给出原因，其余只给通用文本
    pub fn sign_in_failed(error: AuthError) -> Self {
        match error {
            AuthError::UnknownUser | AuthError::WrongPassword => {
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::TokenNotFound
            | AuthError::TokenRejected
            | AuthError::InvalidPayload
            | AuthError::Provider(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        }
    }

    /// 请求体不是合法 JSON 或字段类型不符
    pub fn invalid_argument() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_ARGUMENT)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    fn new(status: StatusCode, body: impl Into<Value>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl From<ValidationErrors> for ApiProblem {
    fn from(errors: ValidationErrors) -> Self {
        let fields: Map<String, Value> = errors
            .fields()
            .iter()
            .map(|(field, rule)| (field.to_string(), Value::from(*rule)))
            .collect();
        Self::new(StatusCode::BAD_REQUEST, fields)
    }
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        (self.status, Json(JsonResult::new(ERROR, self.body))).into_response()
    }
}
