//! 门店版本链领域层（store-domain）
//!
//! 提供门店注册表的领域模型与基础设施协议：
//! - 门店与版本链模型（`store`）及值对象（`value_object`）
//! - 统一错误类型（`error`）
//! - 版本链仓储协议及内存/Postgres 实现（`persist`）
//! - 命令队列协议及内存/AMQP 实现（`queue`）
//!
//! 核心不变量：每个门店至多一个 current 版本，且其序号最大；
//! 并发追加版本时败者得到可重试的 `DomainError::Conflict`。
//!
pub mod error;
pub mod persist;
pub mod queue;
pub mod store;
pub mod value_object;
