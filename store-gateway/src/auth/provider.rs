use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use store_application::RetryPolicy;
use store_domain::value_object::Login;

use super::token::login_claim;
use super::{AuthError, IdentityVerifier, TokenIssuer};
use crate::config::AuthProviderConfig;

/// 外部认证服务的 HTTP 客户端
#[derive(Clone, Debug)]
pub struct AuthProviderClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl AuthProviderClient {
    pub fn new(config: &AuthProviderConfig) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(provider_error)?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            retry: config.retry.policy(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 按重试策略探测认证服务，全部失败时返回最后一次的错误
    #[tracing::instrument(skip(self), fields(url = %self.base_url))]
    pub async fn ping(&self) -> Result<(), AuthError> {
        self.retry
            .run("auth provider ping", || self.ping_once())
            .await?;
        tracing::info!("auth provider reachable");
        Ok(())
    }

    async fn ping_once(&self) -> Result<(), AuthError> {
        let url = format!("{}/ping", self.base_url);
        let response = self.http.get(&url).send().await.map_err(provider_error)?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(AuthError::Provider(format!(
                "cant dial {url} with status code {}",
                status.as_u16()
            ))),
        }
    }
}

#[async_trait]
impl IdentityVerifier for AuthProviderClient {
    async fn verify(&self, token: &str) -> Result<Login, AuthError> {
        let response = self
            .http
            .get(format!("{}/validate", self.base_url))
            .header(AUTHORIZATION, format!("bearer {token}"))
            .send()
            .await
            .map_err(provider_error)?;

        match response.status() {
            StatusCode::OK => login_claim(token),
            StatusCode::BAD_REQUEST => Err(AuthError::TokenNotFound),
            StatusCode::UNAUTHORIZED => Err(AuthError::TokenRejected),
            status => Err(AuthError::Provider(format!(
                "failed to validate token with status code {}",
                status.as_u16()
            ))),
        }
    }
}

#[async_trait]
impl TokenIssuer for AuthProviderClient {
    async fn issue(&self, login: &Login) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &format!("{}/generate", self.base_url),
            &[("login", login.as_str())],
        )
        .map_err(|err| AuthError::Provider(err.to_string()))?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(provider_error)?;

        match response.status() {
            StatusCode::OK => response.text().await.map_err(provider_error),
            StatusCode::BAD_REQUEST => Err(AuthError::TokenNotFound),
            status => Err(AuthError::Provider(format!(
                "failed to make request to {url} with status code {}",
                status.as_u16()
            ))),
        }
    }
}

fn provider_error(err: reqwest::Error) -> AuthError {
    AuthError::Provider(err.to_string())
}
