//! 网关配置
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! shutdown_grace_secs = 5
//!
//! [auth]
//! host = "auth"
//! port = 8081
//! timeout_ms = 2000
//! retry = { attempts = 5, delay_ms = 1000 }
//!
//! [rabbit]
//! host = "rabbitmq"
//! port = 5672
//! username = "guest"
//! password = "guest"
//!
//! [publish]
//! timeout_ms = 3000
//! ```
//!
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use store_application::config::{self, ConfigError, RabbitConfig, RetryConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub auth: AuthProviderConfig,
    pub rabbit: RabbitConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

impl GatewayConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = config::load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = config::parse_toml(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.host.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.host must not be empty".into()));
        }
        if self.publish.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "publish.timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 收到退出信号后等待在途请求的最长时间
    #[serde(default = "default_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_grace_secs() -> u64 {
    5
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// 认证服务（令牌签发与校验）地址
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthProviderConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
    /// 启动时 ping 的重试
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AuthProviderConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    pub timeout_ms: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self { timeout_ms: 3000 }
    }
}

impl PublishConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
