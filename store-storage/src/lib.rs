//! 门店存储服务（store-storage）
//!
//! 从队列消费命令，在版本链仓储上执行，并把结果回调给网关。
//!
pub mod bootstrap;
pub mod config;

pub use config::StorageConfig;
