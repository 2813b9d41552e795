//! 门店网关（store-gateway）
//!
//! 对外的 HTTP 入口：校验调用者身份与请求内容，把操作作为命令发布到
//! 队列后立即返回“已受理”；不等待、也不关联存储服务的执行结果。
//!
pub mod auth;
pub mod config;
pub mod http;
pub mod server;
pub mod state;
pub mod validation;

pub use config::GatewayConfig;
pub use http::build_router;
pub use state::AppState;
