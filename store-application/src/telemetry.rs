//! 日志初始化
//!
//! `APP_ENV=release` 输出 JSON 行，其余情况使用便于阅读的格式；
//! 过滤规则优先取 `RUST_LOG`，缺省时使用调用方给出的指令。
//!
use std::fmt;
use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};

use crate::error::{AppError, AppResult};

pub const ENVIRONMENT_VARIABLE: &str = "APP_ENV";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    Release,
    #[default]
    Development,
}

impl AppEnv {
    /// 读取 `APP_ENV`；未设置或无法识别时为 `Development`
    pub fn from_env() -> Self {
        std::env::var(ENVIRONMENT_VARIABLE)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Release => "release",
            AppEnv::Development => "development",
        }
    }
}

impl FromStr for AppEnv {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "release" => Ok(AppEnv::Release),
            "development" => Ok(AppEnv::Development),
            other => Err(AppError::Validation(format!(
                "unknown environment: {other}"
            ))),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn init_tracing(env: AppEnv, default_directives: &str) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match env {
        AppEnv::Release => registry.with(log_fmt::layer().json()).try_init(),
        AppEnv::Development => registry.with(log_fmt::layer()).try_init(),
    };
    installed.map_err(|err| AppError::Infra(err.to_string()))?;

    tracing::info!(environment = %env, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_environments() {
        assert_eq!("release".parse::<AppEnv>().unwrap(), AppEnv::Release);
        assert_eq!(
            " development ".parse::<AppEnv>().unwrap(),
            AppEnv::Development
        );
        assert!("staging".parse::<AppEnv>().is_err());
    }
}
