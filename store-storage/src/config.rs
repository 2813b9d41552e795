//! 存储服务配置
//!
//! ```toml
//! [postgres]
//! host = "postgres"
//! port = 5432
//! username = "store"
//! password = "store"
//! dbname = "store"
//! statement_timeout_ms = 5000
//! connect = { attempts = 5, delay_ms = 1000 }
//!
//! [rabbit]
//! host = "rabbitmq"
//! port = 5672
//! username = "guest"
//! password = "guest"
//!
//! [gateway]
//! host = "gateway"
//! port = 8080
//! path = "response/"
//!
//! [consumer]
//! concurrency = 8
//! command_timeout_ms = 30000
//! ```
//!
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use store_application::ConsumerConfig;
use store_application::config::{self, ConfigError, RabbitConfig, RetryConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub postgres: PostgresConfig,
    pub rabbit: RabbitConfig,
    pub gateway: CallbackConfig,
    #[serde(default)]
    pub consumer: ConsumerSection,
    /// 版本链冲突的重试
    #[serde(default = "default_conflict_retry")]
    pub conflict_retry: RetryConfig,
}

fn default_conflict_retry() -> RetryConfig {
    RetryConfig {
        attempts: 5,
        delay_ms: 20,
    }
}

impl StorageConfig {
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
        if self.consumer.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "consumer.concurrency must be positive".into(),
            ));
        }
        if self.consumer.command_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "consumer.command_timeout_ms must be positive".into(),
            ));
        }
        if self.postgres.statement_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "postgres.statement_timeout_ms must be positive".into(),
            ));
        }
        if self.conflict_retry.attempts == 0 {
            return Err(ConfigError::Invalid(
                "conflict_retry.attempts must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 从连接池取连接的最长等待
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// 会话级 `statement_timeout`，单条语句超过即由服务端取消
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
    #[serde(default)]
    pub connect: RetryConfig,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

fn default_statement_timeout_ms() -> u64 {
    5000
}

impl PostgresConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.dbname)
            .options([("statement_timeout", self.statement_timeout_ms.to_string())])
    }
}

/// 结果回调地址：`http://{host}:{port}/{path}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallbackConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    #[serde(default = "default_callback_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_callback_timeout_ms() -> u64 {
    2000
}

impl CallbackConfig {
    pub fn url(&self) -> String {
        format!(
            "http://{}:{}/{}",
            self.host,
            self.port,
            self.path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerSection {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// 单条命令（含冲突重试）的处理时限
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

fn default_concurrency() -> usize {
    ConsumerConfig::default().concurrency
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

impl ConsumerSection {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for ConsumerSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl From<ConsumerSection> for ConsumerConfig {
    fn from(section: ConsumerSection) -> Self {
        ConsumerConfig {
            concurrency: section.concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [postgres]
        host = "postgres"
        port = 5432
        username = "store"
        password = "secret"
        dbname = "stores"

        [rabbit]
        host = "rabbitmq"
        port = 5672
        username = "guest"
        password = "guest"

        [gateway]
        host = "gateway"
        port = 8080
        path = "/response/"
    "#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = StorageConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.postgres.connect_options().get_port(), 5432);
        assert_eq!(config.postgres.max_connections, 10);
        assert_eq!(config.postgres.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(config.gateway.url(), "http://gateway:8080/response/");
        assert_eq!(config.gateway.timeout(), Duration::from_secs(2));
        assert_eq!(config.consumer.concurrency, 8);
        assert_eq!(config.consumer.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.postgres.statement_timeout_ms, 5000);
        assert_eq!(config.conflict_retry, default_conflict_retry());
        assert_eq!(config.rabbit.queue, "CreateQueue");
    }

    #[test]
    fn connect_options_carry_statement_timeout() {
        let raw = SAMPLE.replace(
            "dbname = \"stores\"",
            "dbname = \"stores\"\nstatement_timeout_ms = 1500",
        );
        let config = StorageConfig::from_toml_str(&raw).unwrap();
        let options = config.postgres.connect_options();

        assert_eq!(options.get_host(), "postgres");
        assert_eq!(options.get_database(), Some("stores"));
        assert!(
            options
                .get_options()
                .is_some_and(|opts| opts.contains("-c statement_timeout=1500"))
        );
    }

    #[test]
    fn zero_command_timeout_is_invalid() {
        let raw = format!("{SAMPLE}\n[consumer]\ncommand_timeout_ms = 0\n");
        let err = StorageConfig::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_concurrency_is_invalid() {
        let raw = format!("{SAMPLE}\n[consumer]\nconcurrency = 0\n");
        let err = StorageConfig::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
