use std::sync::Arc;

use serde::Deserialize;
use store_domain::value_object::Login;

use super::{AuthError, TokenIssuer, UserDirectory};
use crate::validation::{Rule, Validate, ValidationErrors};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors
            .check("login", &self.login, &[Rule::Required, Rule::Min(3), Rule::Max(50)])
            .check(
                "password",
                &self.password,
                &[Rule::Required, Rule::Min(6), Rule::Max(40)],
            );
        errors.into_result()
    }
}

pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    issuer: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserDirectory>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { users, issuer }
    }

    /// 校验用户名与密码，通过后向认证服务申请访问令牌
    #[tracing::instrument(skip_all, fields(login = %credentials.login))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let user = self
            .users
            .find(&credentials.login)
            .ok_or(AuthError::UnknownUser)?;
        if user.password != credentials.password {
            return Err(AuthError::WrongPassword);
        }

        let login = Login::new(user.login).map_err(|_| AuthError::UnknownUser)?;
        let token = self.issuer.issue(&login).await?;
        tracing::info!("access token issued");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticUserDirectory;
    use async_trait::async_trait;

    struct EchoIssuer;

    #[async_trait]
    impl TokenIssuer for EchoIssuer {
        async fn issue(&self, login: &Login) -> Result<String, AuthError> {
            Ok(format!("token-for-{login}"))
        }
    }

    struct DownIssuer;

    #[async_trait]
    impl TokenIssuer for DownIssuer {
        async fn issue(&self, _login: &Login) -> Result<String, AuthError> {
            Err(AuthError::Provider("connection refused".into()))
        }
    }

    fn service(issuer: Arc<dyn TokenIssuer>) -> AuthService {
        AuthService::new(Arc::new(StaticUserDirectory::default()), issuer)
    }

    fn credentials(login: &str, password: &str) -> Credentials {
        Credentials {
            login: login.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn known_user_gets_token() {
        let token = service(Arc::new(EchoIssuer))
            .sign_in(&credentials("user2", "password2"))
            .await
            .unwrap();
        assert_eq!(token, "token-for-user2");
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_distinct() {
        let svc = service(Arc::new(EchoIssuer));
        assert_eq!(
            svc.sign_in(&credentials("ghost", "password1")).await,
            Err(AuthError::UnknownUser)
        );
        assert_eq!(
            svc.sign_in(&credentials("user1", "password2")).await,
            Err(AuthError::WrongPassword)
        );
    }

    #[tokio::test]
    async fn provider_failure_is_propagated() {
        let err = service(Arc::new(DownIssuer))
            .sign_in(&credentials("user3", "password3"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Provider(_)));
    }

    #[test]
    fn credential_lengths_are_checked() {
        let errors = credentials("ab", "").validate().unwrap_err();
        assert_eq!(errors.fields().get("login"), Some(&"min"));
        assert_eq!(errors.fields().get("password"), Some(&"required"));
        assert!(credentials("user1", "password1").validate().is_ok());
    }
}
