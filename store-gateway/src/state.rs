use std::sync::Arc;

use store_application::CommandPublisher;

use crate::auth::{AuthService, IdentityVerifier};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<CommandPublisher>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        publisher: Arc<CommandPublisher>,
        verifier: Arc<dyn IdentityVerifier>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            publisher,
            verifier,
            auth,
        }
    }
}
