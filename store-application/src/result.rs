//! 结果消息
//!
//! 每条被处理的命令产生一条结果，尽力投递、不做请求关联：
//! 成功为 `{"message": <文本 | 门店 | 版本 | [版本...]>}`，失败为 `{"error": <文本>}`。
//!
use serde::Serialize;
use serde_json::Value;

use crate::dto::Dto;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultMessage {
    Message(Value),
    Error(String),
}

impl ResultMessage {
    pub fn text(message: impl Into<String>) -> Self {
        ResultMessage::Message(Value::String(message.into()))
    }

    pub fn payload<D: Dto>(dto: &D) -> Result<Self, serde_json::Error> {
        Ok(ResultMessage::Message(serde_json::to_value(dto)?))
    }

    pub fn list<D: Dto>(dtos: &[D]) -> Result<Self, serde_json::Error> {
        Ok(ResultMessage::Message(serde_json::to_value(dtos)?))
    }

    pub fn error(message: impl Into<String>) -> Self {
        ResultMessage::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultMessage::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_single_key_object() {
        assert_eq!(
            serde_json::to_value(ResultMessage::text("Store deleted successfully")).unwrap(),
            json!({"message": "Store deleted successfully"})
        );
        assert_eq!(
            serde_json::to_value(ResultMessage::error("store not found")).unwrap(),
            json!({"error": "store not found"})
        );
    }
}
