//! 请求体与路径参数
//!
//! `ValidJson<T>` 先按 JSON 反序列化再执行 `Validate`，任一步失败都在
//! 进入处理函数之前以 400 返回。
//!
use std::str::FromStr;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use store_domain::store::{NewStore, VersionAttributes};

use super::problem::ApiProblem;
use crate::validation::{Rule, Validate, ValidationErrors};

const STORE_NAME: [Rule; 3] = [Rule::Required, Rule::Min(3), Rule::Max(40)];
const ADDRESS: [Rule; 2] = [Rule::Required, Rule::AddressFormat];
const OWNER_NAME: [Rule; 2] = [Rule::Required, Rule::OwnerNameFormat];
const TIME: [Rule; 2] = [Rule::Required, Rule::TimeFormat];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStoreRequest {
    pub name: String,
    pub address: String,
    pub owner_name: String,
    pub opening_time: String,
    pub closing_time: String,
}

impl Validate for CreateStoreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors
            .check("name", &self.name, &STORE_NAME)
            .check("address", &self.address, &ADDRESS)
            .check("ownerName", &self.owner_name, &OWNER_NAME)
            .check("openingTime", &self.opening_time, &TIME)
            .check("closingTime", &self.closing_time, &TIME);
        errors.into_result()
    }
}

impl From<CreateStoreRequest> for NewStore {
    fn from(request: CreateStoreRequest) -> Self {
        NewStore {
            name: request.name,
            address: request.address,
            owner_name: request.owner_name,
            opening_time: request.opening_time,
            closing_time: request.closing_time,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateVersionRequest {
    pub owner_name: String,
    pub opening_time: String,
    pub closing_time: String,
}

impl Validate for CreateVersionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors
            .check("ownerName", &self.owner_name, &OWNER_NAME)
            .check("openingTime", &self.opening_time, &TIME)
            .check("closingTime", &self.closing_time, &TIME);
        errors.into_result()
    }
}

impl From<CreateVersionRequest> for VersionAttributes {
    fn from(request: CreateVersionRequest) -> Self {
        VersionAttributes {
            owner_name: request.owner_name,
            opening_time: request.opening_time,
            closing_time: request.closing_time,
        }
    }
}

/// 已通过校验的 JSON 请求体
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiProblem;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "request body rejected");
                ApiProblem::invalid_argument()
            })?;
        value.validate().inspect_err(|errors| {
            tracing::debug!(fields = ?errors.fields(), "request validation failed");
        })?;
        Ok(Self(value))
    }
}

/// 解析路径中的数字标识，失败时返回 `{field: "numeric"}`
pub fn path_id<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ValidationErrors> {
    raw.parse()
        .map_err(|_| ValidationErrors::single(field, Rule::Numeric))
}
