//! 身份认证
//!
//! - `token`：从 `Authorization` 头取出 bearer 令牌，读取令牌中的 `login` 声明；
//! - `provider`：外部认证服务客户端，负责签发（`/generate`）与校验（`/validate`）；
//! - `users`：静态用户目录；
//! - `service`：登录流程（查用户、比对密码、签发令牌）。
//!
use async_trait::async_trait;
use store_domain::value_object::Login;

mod provider;
mod service;
mod token;
mod users;

pub use provider::AuthProviderClient;
pub use service::{AuthService, Credentials};
pub use token::{bearer_token, login_claim};
pub use users::{StaticUserDirectory, User, UserDirectory};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no access token in headers")]
    MissingToken,

    #[error("invalid token format")]
    MalformedHeader,

    #[error("token not found in header")]
    TokenNotFound,

    #[error("invalid or expired token")]
    TokenRejected,

    #[error("invalid token payload")]
    InvalidPayload,

    #[error("User with provided login does not exist")]
    UnknownUser,

    #[error("Wrong password provided")]
    WrongPassword,

    #[error("auth provider: {0}")]
    Provider(String),
}

/// 校验访问令牌，返回令牌所属的登录名
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Login, AuthError>;
}

/// 为已通过密码校验的登录名签发访问令牌
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, login: &Login) -> Result<String, AuthError>;
}
