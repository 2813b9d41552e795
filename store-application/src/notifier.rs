//! 结果回调（ResultNotifier）
//!
//! 把处理结果带外推送回网关。投递失败由调用方记录日志后吞掉，不重试。
//!
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::result::ResultMessage;

#[async_trait]
pub trait ResultNotifier: Send + Sync {
    async fn notify(&self, result: &ResultMessage) -> AppResult<()>;
}

/// 通过 HTTP POST JSON 投递到网关回调地址
pub struct HttpResultNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpResultNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Infra(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ResultNotifier for HttpResultNotifier {
    async fn notify(&self, result: &ResultMessage) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(result)
            .send()
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Delivery(format!(
                "unexpected status code: {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}
