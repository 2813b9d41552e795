use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use store_application::context::AppContext;

use super::problem::ApiProblem;
use crate::auth::{AuthError, bearer_token};
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 校验访问令牌，把调用者身份以 `AppContext` 放入请求扩展
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiProblem> {
    let headers = request.headers();
    let raw = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()
        .map_err(ApiProblem::unauthorized)?;
    let token = bearer_token(raw)
        .map_err(ApiProblem::unauthorized)?
        .to_owned();
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let login = state.verifier.verify(&token).await.map_err(|err| {
        tracing::warn!(error = %err, "access token rejected");
        ApiProblem::unauthorized(err)
    })?;

    let mut ctx = AppContext::new(login);
    if let Some(request_id) = request_id {
        ctx = ctx.with_request_id(request_id);
    }
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}
