//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑：
//! - `StoreId` / `VersionId`：仓储分配的数值标识，可从路由/消息中的字符串解析；
//! - `VersionNumber`：版本链序号，从 1 开始单调递增；
//! - `Login`：已验证的调用者登录名。
//!

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

fn parse_positive_id(kind: &str, raw: &str) -> Result<i64, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_value(format!("{kind} is empty")));
    }
    let value: i64 = trimmed.parse()?;
    if value <= 0 {
        return Err(DomainError::invalid_value(format!(
            "{kind} must be positive, got {value}"
        )));
    }
    Ok(value)
}

/// 门店标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(i64);

impl StoreId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for StoreId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive_id("store id", s).map(Self)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StoreId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// 门店版本标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(i64);

impl VersionId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for VersionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive_id("version id", s).map(Self)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VersionId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// 版本链序号
///
/// 提供类型安全的序号操作，避免直接使用 i32 导致的语义不明确问题。
///
/// # 示例
///
/// ```
/// use store_domain::value_object::VersionNumber;
///
/// let v1 = VersionNumber::first();
/// assert_eq!(v1.value(), 1);
///
/// let v2 = v1.next().unwrap();
/// assert_eq!(v2.value(), 2);
/// assert!(v2 > v1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionNumber(i32);

impl VersionNumber {
    /// 随门店一起创建的首个版本
    pub const fn first() -> Self {
        Self(1)
    }

    pub const fn from_value(value: i32) -> Self {
        Self(value)
    }

    /// 序号达到上限时返回 `InvalidValue`
    pub fn next(&self) -> Result<Self, DomainError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| {
                DomainError::invalid_value(format!("version number overflow after {self}"))
            })
    }

    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// 调用者登录名（由网关验证令牌后得到）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Login(String);

impl Login {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let login = Self(value.into());
        login.validate()?;
        Ok(login)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Login {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.trim().is_empty() {
            return Err(DomainError::invalid_value("login is empty"));
        }
        Ok(())
    }
}

impl AsRef<str> for Login {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_id_parses_positive_numbers() {
        let id: StoreId = "42".parse().unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn store_id_rejects_garbage() {
        assert!(matches!(
            "abc".parse::<StoreId>(),
            Err(DomainError::Parse { .. })
        ));
        assert!(matches!(
            "".parse::<StoreId>(),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            "0".parse::<StoreId>(),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            "-3".parse::<VersionId>(),
            Err(DomainError::InvalidValue { .. })
        ));
    }

    #[test]
    fn version_number_starts_at_one() {
        let v = VersionNumber::first();
        assert_eq!(v.value(), 1);
        assert_eq!(v.next().unwrap().next().unwrap().value(), 3);
        assert_eq!(format!("{}", v), "v1");
    }

    #[test]
    fn version_number_does_not_wrap() {
        let last = VersionNumber::from_value(i32::MAX);
        assert!(matches!(last.next(), Err(DomainError::InvalidValue { .. })));
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&VersionId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: StoreId = serde_json::from_str("9").unwrap();
        assert_eq!(back, StoreId::new(9));
    }

    #[test]
    fn blank_login_is_rejected() {
        assert!(Login::new("  ").is_err());
        assert_eq!(Login::new("user1").unwrap().as_str(), "user1");
    }
}
