use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;
use store_domain::value_object::Login;

use super::AuthError;

/// 取出 `Bearer <token>` 中的令牌；头必须恰好两段且前缀区分大小写
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let raw = match header {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(AuthError::MissingToken),
    };

    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// 读取令牌载荷段的 `login` 声明，不校验签名（签名由认证服务负责）
pub fn login_claim(token: &str) -> Result<Login, AuthError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(AuthError::InvalidPayload),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthError::InvalidPayload)?;
    let claims: Value = serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidPayload)?;

    claims
        .get("login")
        .and_then(Value::as_str)
        .ok_or(AuthError::InvalidPayload)
        .and_then(|login| Login::new(login).map_err(|_| AuthError::InvalidPayload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("bearer abc")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::MalformedHeader));
        assert_eq!(
            bearer_token(Some("Bearer abc extra")),
            Err(AuthError::MalformedHeader)
        );
    }

    #[test]
    fn reads_login_claim() {
        let token = token_with(r#"{"login":"user1","exp":1700000000}"#);
        assert_eq!(login_claim(&token).unwrap().as_str(), "user1");
    }

    #[test]
    fn tolerates_padded_payload() {
        let token = format!(
            "h.{}=.s",
            URL_SAFE_NO_PAD.encode(r#"{"login":"user2"}"#)
        );
        assert_eq!(login_claim(&token).unwrap().as_str(), "user2");
    }

    #[test]
    fn rejects_tokens_without_login() {
        assert_eq!(
            login_claim(&token_with(r#"{"sub":"user1"}"#)),
            Err(AuthError::InvalidPayload)
        );
        assert_eq!(
            login_claim(&token_with(r#"{"login":42}"#)),
            Err(AuthError::InvalidPayload)
        );
        assert_eq!(login_claim("not-a-jwt"), Err(AuthError::InvalidPayload));
        assert_eq!(login_claim("a.%%%.c"), Err(AuthError::InvalidPayload));
    }
}
