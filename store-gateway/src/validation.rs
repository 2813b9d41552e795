//! 请求校验
//!
//! 请求体在发布命令前逐字段校验，每个字段只记录第一条未通过的规则，
//! 结果以 `字段 -> 规则名` 的映射返回给调用者。
//!
use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use store_domain::store::OPENING_HOURS_FORMAT;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static ADDRESS: Pattern =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+,\s?[A-Za-z\s]+,\s?[A-Za-z0-9\s]+$"));

static OWNER_NAME: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+,\s?[A-Za-z\s]+$"));

static DATE_TIME: Pattern =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Min(usize),
    Max(usize),
    /// `City, Street, Number`
    AddressFormat,
    /// `First, Last`
    OwnerNameFormat,
    /// `YYYY-MM-DD HH:MM:SS`，且必须是合法时间
    TimeFormat,
    Numeric,
}

impl Rule {
    pub fn tag(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::AddressFormat => "addressFormat",
            Rule::OwnerNameFormat => "ownerNameFormat",
            Rule::TimeFormat => "timeFormat",
            Rule::Numeric => "numeric",
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Rule::Required => !value.is_empty(),
            Rule::Min(min) => value.chars().count() >= *min,
            Rule::Max(max) => value.chars().count() <= *max,
            Rule::AddressFormat => matches(&ADDRESS, value),
            Rule::OwnerNameFormat => matches(&OWNER_NAME, value),
            Rule::TimeFormat => {
                matches(&DATE_TIME, value)
                    && NaiveDateTime::parse_from_str(value, OPENING_HOURS_FORMAT).is_ok()
            }
            Rule::Numeric => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
        }
    }
}

/// 模式编译失败时记录错误并拒绝输入
fn matches(pattern: &Pattern, value: &str) -> bool {
    match &**pattern {
        Ok(re) => re.is_match(value),
        Err(err) => {
            tracing::error!(error = %err, "validation pattern failed to compile");
            false
        }
    }
}

/// 字段到首个失败规则名的映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("request validation failed: {0:?}")]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    pub fn single(field: &'static str, rule: Rule) -> Self {
        let mut errors = Self::default();
        errors.0.insert(field, rule.tag());
        errors
    }

    /// 依次检查规则，记录第一条未通过的
    pub fn check(&mut self, field: &'static str, value: &str, rules: &[Rule]) -> &mut Self {
        if let Some(rule) = rules.iter().find(|rule| !rule.accepts(value)) {
            self.0.insert(field, rule.tag());
        }
        self
    }

    pub fn fields(&self) -> &BTreeMap<&'static str, &'static str> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}
