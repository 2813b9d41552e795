//! HTTP 接口
//!
//! 所有响应统一为 `{"message": ..., "body": ...}`：
//! - 受理：200 `Success`；
//! - 校验失败：400，正文为字段到规则名的映射；
//! - 令牌缺失或无效：401；
//! - 发布失败：500 `Failed to publish a message`。
//!
pub mod handlers;
pub mod middleware;
pub mod problem;
pub mod request;
pub mod response;
pub mod router;

pub use problem::{ApiProblem, ApiResult};
pub use router::build_router;
