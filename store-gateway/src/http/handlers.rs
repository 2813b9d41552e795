//! 路由处理函数
//!
//! `/storage/*` 处理函数只做校验与发布：命令发布成功即返回“已受理”，
//! 执行结果由存储服务回调 `POST /response/` 送达。
//!
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::{Value, json};
use store_application::command::StoreCommand;
use store_application::context::AppContext;
use store_domain::value_object::{StoreId, VersionId};

use super::problem::{ApiProblem, ApiResult};
use super::request::{CreateStoreRequest, CreateVersionRequest, ValidJson, path_id};
use super::response::{ACCESS_TOKEN, JsonResult};
use crate::auth::Credentials;
use crate::state::AppState;

type Accepted = Json<JsonResult<&'static str>>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn sign_in(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> ApiResult<Json<JsonResult<String>>> {
    let token = state.auth.sign_in(&credentials).await.map_err(|err| {
        tracing::error!(error = %err, login = %credentials.login, "error while signing in");
        ApiProblem::sign_in_failed(err)
    })?;
    Ok(Json(JsonResult::new(ACCESS_TOKEN, token)))
}

pub async fn create_store(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    ValidJson(request): ValidJson<CreateStoreRequest>,
) -> ApiResult<Accepted> {
    dispatch(&state, &ctx, StoreCommand::CreateStore(request.into())).await
}

pub async fn create_version(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<CreateVersionRequest>,
) -> ApiResult<Accepted> {
    let command = StoreCommand::CreateVersion {
        store_id: store_id(&id)?,
        attrs: request.into(),
    };
    dispatch(&state, &ctx, command).await
}

pub async fn delete_store(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Accepted> {
    let command = StoreCommand::DeleteStore {
        store_id: store_id(&id)?,
    };
    dispatch(&state, &ctx, command).await
}

pub async fn delete_version(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    Path((id, version_id)): Path<(String, String)>,
) -> ApiResult<Accepted> {
    let command = StoreCommand::DeleteVersion {
        store_id: store_id(&id)?,
        version_id: version_id_of(&version_id)?,
    };
    dispatch(&state, &ctx, command).await
}

pub async fn get_store(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Accepted> {
    let command = StoreCommand::GetStore {
        store_id: store_id(&id)?,
    };
    dispatch(&state, &ctx, command).await
}

pub async fn get_history(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Accepted> {
    let command = StoreCommand::GetHistory {
        store_id: store_id(&id)?,
    };
    dispatch(&state, &ctx, command).await
}

pub async fn get_version(
    State(state): State<AppState>,
    Extension(ctx): Extension<AppContext>,
    Path((id, version_id)): Path<(String, String)>,
) -> ApiResult<Accepted> {
    let command = StoreCommand::GetVersion {
        store_id: store_id(&id)?,
        version_id: version_id_of(&version_id)?,
    };
    dispatch(&state, &ctx, command).await
}

/// 存储服务的结果回调，原样回显
pub async fn handle_response(Json(payload): Json<Value>) -> Json<Value> {
    tracing::info!(payload = %payload, "received storage service response");
    Json(payload)
}

async fn dispatch(state: &AppState, ctx: &AppContext, command: StoreCommand) -> ApiResult<Accepted> {
    state
        .publisher
        .publish(ctx, &command)
        .await
        .map_err(ApiProblem::from_app)?;
    Ok(Json(JsonResult::accepted()))
}

fn store_id(raw: &str) -> ApiResult<StoreId> {
    Ok(path_id("id", raw)?)
}

fn version_id_of(raw: &str) -> ApiResult<VersionId> {
    Ok(path_id("versionId", raw)?)
}
