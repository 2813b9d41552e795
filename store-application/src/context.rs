use store_domain::value_object::Login;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用所需的横切信息：
/// - 调用者登录名（`login`）：由网关验证令牌后得到，随命令消息传到存储服务；
/// - 请求标识（`request_id`）：网关侧的 `x-request-id`，仅用于日志关联，
///   不会写入命令消息（结果回调不做请求关联）。
///
/// 典型用法：
/// ```rust
/// use store_application::context::AppContext;
/// use store_domain::value_object::Login;
///
/// let ctx = AppContext::new(Login::new("user1").unwrap()).with_request_id("req-1");
/// assert_eq!(ctx.login.as_str(), "user1");
/// ```
#[derive(Clone, Debug)]
pub struct AppContext {
    pub login: Login,
    pub request_id: Option<String>,
}

impl AppContext {
    pub fn new(login: Login) -> Self {
        Self {
            login,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
