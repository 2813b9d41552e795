//! 命令协议
//!
//! - `Action`：封闭的动作集合，线上以 snake_case 字符串表示；
//! - `StoreCommand`：携带强类型负载的命令，按动作一一对应；
//! - `CommandMessage`：队列中的 JSON 信封，缺省的 id 编码为空字符串。
//!
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store_domain::error::{DomainError, DomainResult};
use store_domain::store::{NewStore, VersionAttributes};
use store_domain::value_object::{Login, StoreId, VersionId};

/// 命令动作（稳定名称，用于日志与路由）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateStore,
    CreateStoreVersion,
    DeleteStore,
    DeleteStoreVersion,
    GetStore,
    GetStoreHistory,
    GetStoreVersion,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::CreateStore => "create_store",
            Action::CreateStoreVersion => "create_store_version",
            Action::DeleteStore => "delete_store",
            Action::DeleteStoreVersion => "delete_store_version",
            Action::GetStore => "get_store",
            Action::GetStoreHistory => "get_store_history",
            Action::GetStoreVersion => "get_store_version",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 应用层命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    CreateStore(NewStore),
    CreateVersion {
        store_id: StoreId,
        attrs: VersionAttributes,
    },
    DeleteStore {
        store_id: StoreId,
    },
    DeleteVersion {
        store_id: StoreId,
        version_id: VersionId,
    },
    GetStore {
        store_id: StoreId,
    },
    GetHistory {
        store_id: StoreId,
    },
    GetVersion {
        store_id: StoreId,
        version_id: VersionId,
    },
}

impl StoreCommand {
    pub fn action(&self) -> Action {
        match self {
            StoreCommand::CreateStore(_) => Action::CreateStore,
            StoreCommand::CreateVersion { .. } => Action::CreateStoreVersion,
            StoreCommand::DeleteStore { .. } => Action::DeleteStore,
            StoreCommand::DeleteVersion { .. } => Action::DeleteStoreVersion,
            StoreCommand::GetStore { .. } => Action::GetStore,
            StoreCommand::GetHistory { .. } => Action::GetStoreHistory,
            StoreCommand::GetVersion { .. } => Action::GetStoreVersion,
        }
    }

    pub fn store_id(&self) -> Option<StoreId> {
        match self {
            StoreCommand::CreateStore(_) => None,
            StoreCommand::CreateVersion { store_id, .. }
            | StoreCommand::DeleteStore { store_id }
            | StoreCommand::DeleteVersion { store_id, .. }
            | StoreCommand::GetStore { store_id }
            | StoreCommand::GetHistory { store_id }
            | StoreCommand::GetVersion { store_id, .. } => Some(*store_id),
        }
    }

    pub fn version_id(&self) -> Option<VersionId> {
        match self {
            StoreCommand::DeleteVersion { version_id, .. }
            | StoreCommand::GetVersion { version_id, .. } => Some(*version_id),
            _ => None,
        }
    }

    fn data(&self) -> DomainResult<Value> {
        Ok(match self {
            StoreCommand::CreateStore(attrs) => serde_json::to_value(attrs)?,
            StoreCommand::CreateVersion { attrs, .. } => serde_json::to_value(attrs)?,
            _ => Value::Null,
        })
    }
}

/// 队列中的命令信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMessage {
    pub action: Action,
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub data: Value,
    pub user_login: String,
}

impl CommandMessage {
    pub fn new(login: &Login, command: &StoreCommand) -> DomainResult<Self> {
        Ok(Self {
            action: command.action(),
            store_id: command
                .store_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            version_id: command
                .version_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            data: command.data()?,
            user_login: login.to_string(),
        })
    }

    pub fn encode(&self) -> DomainResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 解码信封；未知动作或非法 JSON 返回错误
    pub fn decode(payload: &[u8]) -> DomainResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// 按动作解析 id 与负载，得到强类型命令
    pub fn into_command(self) -> DomainResult<(Login, StoreCommand)> {
        let login = Login::new(self.user_login)?;
        let store_id = || self.store_id.parse::<StoreId>();
        let version_id = || self.version_id.parse::<VersionId>();

        let command = match self.action {
            Action::CreateStore => StoreCommand::CreateStore(payload(self.data.clone())?),
            Action::CreateStoreVersion => StoreCommand::CreateVersion {
                store_id: store_id()?,
                attrs: payload(self.data.clone())?,
            },
            Action::DeleteStore => StoreCommand::DeleteStore {
                store_id: store_id()?,
            },
            Action::DeleteStoreVersion => StoreCommand::DeleteVersion {
                store_id: store_id()?,
                version_id: version_id()?,
            },
            Action::GetStore => StoreCommand::GetStore {
                store_id: store_id()?,
            },
            Action::GetStoreHistory => StoreCommand::GetHistory {
                store_id: store_id()?,
            },
            Action::GetStoreVersion => StoreCommand::GetVersion {
                store_id: store_id()?,
                version_id: version_id()?,
            },
        };
        Ok((login, command))
    }
}

fn payload<T: serde::de::DeserializeOwned>(data: Value) -> DomainResult<T> {
    if data.is_null() {
        return Err(DomainError::invalid_value("command data is missing"));
    }
    Ok(serde_json::from_value(data)?)
}
