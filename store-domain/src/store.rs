//! 门店与版本链模型
//!
//! - `Store`：带不可变创建者的门店实体，创建后不做原地更新；
//! - `StoreVersion`：可变属性（负责人、营业时间）的快照，按门店组成版本链，
//!   同一门店至多一个 `is_current` 版本且其序号最大；
//! - `NewStore` / `VersionAttributes`：创建门店与追加版本时的输入属性。
//!
use bon::Builder;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::{StoreId, ValueObject, VersionId, VersionNumber};

/// 营业时间格式（`YYYY-MM-DD HH:MM:SS`）
pub const OPENING_HOURS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 门店实体
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct Store {
    id: StoreId,
    name: String,
    address: String,
    owner_name: String,
    opening_time: String,
    closing_time: String,
    /// 创建者登录名，唯一有权删除门店及其版本的主体
    creator_login: String,
    created_at: DateTime<Utc>,
}

impl Store {
    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn opening_time(&self) -> &str {
        &self.opening_time
    }

    pub fn closing_time(&self) -> &str {
        &self.closing_time
    }

    pub fn creator_login(&self) -> &str {
        &self.creator_login
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_created_by(&self, login: &str) -> bool {
        self.creator_login == login
    }
}

/// 门店版本
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct StoreVersion {
    id: VersionId,
    store_id: StoreId,
    version_number: VersionNumber,
    owner_name: String,
    opening_time: String,
    closing_time: String,
    /// 创建本版本的登录名
    creator_login: String,
    created_at: DateTime<Utc>,
    is_current: bool,
}

impl StoreVersion {
    pub fn id(&self) -> VersionId {
        self.id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn version_number(&self) -> VersionNumber {
        self.version_number
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn opening_time(&self) -> &str {
        &self.opening_time
    }

    pub fn closing_time(&self) -> &str {
        &self.closing_time
    }

    pub fn creator_login(&self) -> &str {
        &self.creator_login
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_current(&self) -> bool {
        self.is_current
    }

    pub fn belongs_to(&self, store_id: StoreId) -> bool {
        self.store_id == store_id
    }

    /// 被新版本取代时清除 current 标记
    pub(crate) fn retire(&mut self) {
        self.is_current = false;
    }
}

/// 创建门店的输入属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    pub address: String,
    pub owner_name: String,
    pub opening_time: String,
    pub closing_time: String,
}

impl NewStore {
    /// 随门店一起写入的版本 1 属性
    pub fn version_attributes(&self) -> VersionAttributes {
        VersionAttributes {
            owner_name: self.owner_name.clone(),
            opening_time: self.opening_time.clone(),
            closing_time: self.closing_time.clone(),
        }
    }
}

impl ValueObject for NewStore {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        require_filled("name", &self.name)?;
        require_filled("address", &self.address)?;
        self.version_attributes().validate()
    }
}

/// 追加版本的输入属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionAttributes {
    pub owner_name: String,
    pub opening_time: String,
    pub closing_time: String,
}

impl ValueObject for VersionAttributes {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        require_filled("ownerName", &self.owner_name)?;
        NaiveDateTime::parse_from_str(&self.opening_time, OPENING_HOURS_FORMAT)?;
        NaiveDateTime::parse_from_str(&self.closing_time, OPENING_HOURS_FORMAT)?;
        Ok(())
    }
}

fn require_filled(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_value(format!("{field} is empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> VersionAttributes {
        VersionAttributes {
            owner_name: "John, Smith".into(),
            opening_time: "2024-01-01 08:00:00".into(),
            closing_time: "2024-01-01 20:00:00".into(),
        }
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let raw = r#"{"name":"Corner","address":"Moscow, Tverskaya, 1","ownerName":"John, Smith","openingTime":"2024-01-01 08:00:00","closingTime":"2024-01-01 20:00:00"}"#;
        let store: NewStore = serde_json::from_str(raw).unwrap();
        assert_eq!(store.owner_name, "John, Smith");
        assert!(store.validate().is_ok());
        assert_eq!(store.version_attributes(), attrs());
    }

    #[test]
    fn malformed_hours_are_rejected() {
        let mut bad = attrs();
        bad.closing_time = "20:00".into();
        assert!(matches!(bad.validate(), Err(DomainError::Parse { .. })));
    }

    #[test]
    fn blank_name_is_rejected() {
        let store = NewStore {
            name: " ".into(),
            address: "Moscow, Tverskaya, 1".into(),
            owner_name: "John, Smith".into(),
            opening_time: "2024-01-01 08:00:00".into(),
            closing_time: "2024-01-01 20:00:00".into(),
        };
        assert!(matches!(
            store.validate(),
            Err(DomainError::InvalidValue { .. })
        ));
    }

    #[test]
    fn creator_check_is_exact() {
        let store = Store::builder()
            .id(StoreId::new(1))
            .name("Corner".into())
            .address("Moscow, Tverskaya, 1".into())
            .owner_name("John, Smith".into())
            .opening_time("2024-01-01 08:00:00".into())
            .closing_time("2024-01-01 20:00:00".into())
            .creator_login("user1".into())
            .created_at(Utc::now())
            .build();
        assert!(store.is_created_by("user1"));
        assert!(!store.is_created_by("user2"));
    }
}
