//! 持久化（persist）
//!
//! 定义门店版本链仓储协议及其实现：
//! - 协议与历史排序规则（`VersionChainRepository`、`sort_history`）；
//! - 内存多版本并发控制实现（`InMemoryVersionChainRepository`）；
//! - Postgres 可串行化事务实现（`PgVersionChainRepository`，`infra-sqlx` 特性）。
//!
mod inmemory;
#[cfg(feature = "infra-sqlx")]
mod postgres;
mod version_chain_repository;

pub use inmemory::{InMemoryTransaction, InMemoryVersionChainRepository};
#[cfg(feature = "infra-sqlx")]
pub use postgres::PgVersionChainRepository;
pub use version_chain_repository::{VersionChainRepository, sort_history};
