use chrono::{DateTime, Utc};
use serde::Serialize;
use store_domain::store::{Store, StoreVersion};

/// 数据传输对象（DTO）
///
/// - 作为应用层的输出载体，面向结果回调序列化；
/// - 与领域模型解耦，避免将领域对象直接暴露到接口层。
pub trait Dto: Serialize + Send + Sync + 'static {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDto {
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub creator_login: String,
    pub owner_name: String,
    pub opening_time: String,
    pub closing_time: String,
    pub created_at: DateTime<Utc>,
}

impl Dto for StoreDto {}

impl From<&Store> for StoreDto {
    fn from(store: &Store) -> Self {
        Self {
            store_id: store.id().value(),
            name: store.name().to_string(),
            address: store.address().to_string(),
            creator_login: store.creator_login().to_string(),
            owner_name: store.owner_name().to_string(),
            opening_time: store.opening_time().to_string(),
            closing_time: store.closing_time().to_string(),
            created_at: store.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreVersionDto {
    pub version_id: i64,
    pub store_id: i64,
    pub version_number: i32,
    pub creator_login: String,
    pub owner_name: String,
    pub opening_time: String,
    pub closing_time: String,
    pub created_at: DateTime<Utc>,
    pub is_current: bool,
}

impl Dto for StoreVersionDto {}

impl From<&StoreVersion> for StoreVersionDto {
    fn from(version: &StoreVersion) -> Self {
        Self {
            version_id: version.id().value(),
            store_id: version.store_id().value(),
            version_number: version.version_number().value(),
            creator_login: version.creator_login().to_string(),
            owner_name: version.owner_name().to_string(),
            opening_time: version.opening_time().to_string(),
            closing_time: version.closing_time().to_string(),
            created_at: version.created_at(),
            is_current: version.is_current(),
        }
    }
}
