//! 版本链仓储协议
//!
//! 门店及其只追加版本历史的持久化抽象。除只读查询外，每个写操作都在一个
//! 可串行化事务内完成，中途失败整体回滚；并发追加版本的败者返回可重试的
//! `DomainError::Conflict`。
//!
use crate::error::DomainResult;
use crate::store::{NewStore, Store, StoreVersion, VersionAttributes};
use crate::value_object::{Login, StoreId, VersionId};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait VersionChainRepository: Send + Sync {
    /// 写入门店行与版本 1（`is_current = true`）
    async fn create_store(&self, attrs: &NewStore, creator: &Login) -> DomainResult<StoreId>;

    /// 读取当前版本并置为非 current，以 `序号 + 1` 插入新的 current 版本
    async fn create_version(
        &self,
        store_id: StoreId,
        attrs: &VersionAttributes,
        creator: &Login,
    ) -> DomainResult<VersionId>;

    /// 删除全部版本后删除门店行
    async fn delete_store(&self, store_id: StoreId) -> DomainResult<()>;

    /// 仅删除一行，不改动其他版本的序号与标记
    async fn delete_version(&self, version_id: VersionId) -> DomainResult<()>;

    async fn get_store(&self, store_id: StoreId) -> DomainResult<Option<Store>>;

    /// 按创建时间倒序（同一时刻按序号倒序）
    async fn version_history(&self, store_id: StoreId) -> DomainResult<Vec<StoreVersion>>;

    async fn get_version(&self, version_id: VersionId) -> DomainResult<Option<StoreVersion>>;

    /// 仅当版本归属于该门店时返回
    async fn get_store_version(
        &self,
        store_id: StoreId,
        version_id: VersionId,
    ) -> DomainResult<Option<StoreVersion>>;

    /// 门店不存在返回 `StoreNotFound`，非创建者返回 `PermissionDenied`
    async fn check_creator(&self, store_id: StoreId, login: &Login) -> DomainResult<()>;
}

#[async_trait]
impl<T> VersionChainRepository for Arc<T>
where
    T: VersionChainRepository + ?Sized,
{
    async fn create_store(&self, attrs: &NewStore, creator: &Login) -> DomainResult<StoreId> {
        (**self).create_store(attrs, creator).await
    }

    async fn create_version(
        &self,
        store_id: StoreId,
        attrs: &VersionAttributes,
        creator: &Login,
    ) -> DomainResult<VersionId> {
        (**self).create_version(store_id, attrs, creator).await
    }

    async fn delete_store(&self, store_id: StoreId) -> DomainResult<()> {
        (**self).delete_store(store_id).await
    }

    async fn delete_version(&self, version_id: VersionId) -> DomainResult<()> {
        (**self).delete_version(version_id).await
    }

    async fn get_store(&self, store_id: StoreId) -> DomainResult<Option<Store>> {
        (**self).get_store(store_id).await
    }

    async fn version_history(&self, store_id: StoreId) -> DomainResult<Vec<StoreVersion>> {
        (**self).version_history(store_id).await
    }

    async fn get_version(&self, version_id: VersionId) -> DomainResult<Option<StoreVersion>> {
        (**self).get_version(version_id).await
    }

    async fn get_store_version(
        &self,
        store_id: StoreId,
        version_id: VersionId,
    ) -> DomainResult<Option<StoreVersion>> {
        (**self).get_store_version(store_id, version_id).await
    }

    async fn check_creator(&self, store_id: StoreId, login: &Login) -> DomainResult<()> {
        (**self).check_creator(store_id, login).await
    }
}

/// 按历史展示顺序排序：创建时间倒序，同一时刻按序号倒序
pub fn sort_history(versions: &mut [StoreVersion]) {
    versions.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.version_number().cmp(&a.version_number()))
    });
}
