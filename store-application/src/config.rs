//! 配置加载
//!
//! 两个服务进程都从 TOML 文件读取配置；这里放共用的部分：
//! - `load_toml`：读文件并反序列化为调用方的配置结构；
//! - `RabbitConfig`：代理连接参数与命令队列名；
//! - `RetryConfig`：启动期连接的重试次数与间隔。
//!
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use store_domain::queue::COMMAND_QUEUE;

use crate::retry::RetryPolicy;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_toml(&raw)
}

pub fn parse_toml<T: DeserializeOwned>(raw: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(raw)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RabbitConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(default)]
    pub connect: RetryConfig,
}

fn default_queue() -> String {
    COMMAND_QUEUE.to_string()
}

impl RabbitConfig {
    pub fn uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/",
            self.username, self.password, self.host, self.port
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.delay_ms))
    }
}
