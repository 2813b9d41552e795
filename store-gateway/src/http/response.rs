use serde::Serialize;

pub const SUCCESS: &str = "Success";
pub const ERROR: &str = "Error";
pub const ACCESS_TOKEN: &str = "Access token";
/// 命令已发布时的响应正文；执行结果经回调另行送达
pub const ACCEPTED: &str = "Storage service is processing your message. Check status through logs";

/// 网关统一响应外形
#[derive(Debug, Clone, Serialize)]
pub struct JsonResult<B> {
    pub message: &'static str,
    pub body: B,
}

impl<B> JsonResult<B> {
    pub fn new(message: &'static str, body: B) -> Self {
        Self { message, body }
    }
}

impl JsonResult<&'static str> {
    pub fn accepted() -> Self {
        Self::new(SUCCESS, ACCEPTED)
    }
}
