//! 内存版版本链仓储（InMemoryVersionChainRepository）
//!
//! 基于 `im` 持久化映射的多版本并发控制实现，满足 `VersionChainRepository` 协议：
//! - 每个事务在开始时获取一份已提交数据的快照（结构共享，克隆代价低）；
//! - 事务内的读写都作用于快照副本，并记录写日志；
//! - 提交时校验事务读过或写过的门店的修订号，若已被其他事务推进则返回
//!   `DomainError::Conflict`（先提交者胜）；否则重放写日志并推进修订号。
//!
//! 典型用途：测试环境、示例与本地开发。未提交即丢弃的事务等同于回滚。

use crate::error::{DomainError, DomainResult};
use crate::persist::{VersionChainRepository, sort_history};
use crate::store::{NewStore, Store, StoreVersion, VersionAttributes};
use crate::value_object::{Login, StoreId, VersionId, VersionNumber};
use async_trait::async_trait;
use chrono::Utc;
use im::OrdMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Clone, Default)]
struct Tables {
    stores: OrdMap<StoreId, Store>,
    versions: OrdMap<VersionId, StoreVersion>,
    /// 每个门店的已提交修订号
    revisions: OrdMap<StoreId, u64>,
}

impl Tables {
    fn versions_of(&self, store_id: StoreId) -> Vec<StoreVersion> {
        self.versions
            .values()
            .filter(|v| v.belongs_to(store_id))
            .cloned()
            .collect()
    }

    fn apply(&mut self, write: Write) {
        match write {
            Write::PutStore(store) => {
                self.stores.insert(store.id(), store);
            }
            Write::RemoveStore(id) => {
                self.stores.remove(&id);
            }
            Write::PutVersion(version) => {
                self.versions.insert(version.id(), version);
            }
            Write::RemoveVersion(id) => {
                self.versions.remove(&id);
            }
        }
    }
}

#[derive(Clone)]
enum Write {
    PutStore(Store),
    RemoveStore(StoreId),
    PutVersion(StoreVersion),
    RemoveVersion(VersionId),
}

/// 内存版本链仓储
#[derive(Default)]
pub struct InMemoryVersionChainRepository {
    committed: RwLock<Tables>,
    store_seq: AtomicI64,
    version_seq: AtomicI64,
}

impl InMemoryVersionChainRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开启事务：获取当前已提交数据的快照
    pub async fn begin(&self) -> InMemoryTransaction<'_> {
        let snapshot = self.committed.read().await.clone();
        InMemoryTransaction {
            repo: self,
            base: snapshot.revisions.clone(),
            working: snapshot,
            watched: HashSet::new(),
            dirty: HashSet::new(),
            writes: Vec::new(),
        }
    }

    async fn read(&self) -> Tables {
        self.committed.read().await.clone()
    }

    fn next_store_id(&self) -> StoreId {
        StoreId::new(self.store_seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn next_version_id(&self) -> VersionId {
        VersionId::new(self.version_seq.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// 内存事务
///
/// 读取会登记门店到读集合；提交时读集合与写集合中任一门店的修订号变化都会导致冲突。
pub struct InMemoryTransaction<'a> {
    repo: &'a InMemoryVersionChainRepository,
    working: Tables,
    base: OrdMap<StoreId, u64>,
    watched: HashSet<StoreId>,
    dirty: HashSet<StoreId>,
    writes: Vec<Write>,
}

impl InMemoryTransaction<'_> {
    pub fn store(&mut self, store_id: StoreId) -> Option<Store> {
        self.watched.insert(store_id);
        self.working.stores.get(&store_id).cloned()
    }

    pub fn current_version(&mut self, store_id: StoreId) -> Option<StoreVersion> {
        self.watched.insert(store_id);
        self.working
            .versions
            .values()
            .find(|v| v.belongs_to(store_id) && v.is_current())
            .cloned()
    }

    pub fn insert_store(&mut self, attrs: &NewStore, creator: &Login) -> (StoreId, VersionId) {
        let now = Utc::now();
        let store = Store::builder()
            .id(self.repo.next_store_id())
            .name(attrs.name.clone())
            .address(attrs.address.clone())
            .owner_name(attrs.owner_name.clone())
            .opening_time(attrs.opening_time.clone())
            .closing_time(attrs.closing_time.clone())
            .creator_login(creator.to_string())
            .created_at(now)
            .build();
        let store_id = store.id();
        let first = StoreVersion::builder()
            .id(self.repo.next_version_id())
            .store_id(store_id)
            .version_number(VersionNumber::first())
            .owner_name(attrs.owner_name.clone())
            .opening_time(attrs.opening_time.clone())
            .closing_time(attrs.closing_time.clone())
            .creator_login(creator.to_string())
            .created_at(now)
            .is_current(true)
            .build();
        let version_id = first.id();

        self.write(store_id, Write::PutStore(store));
        self.write(store_id, Write::PutVersion(first));
        (store_id, version_id)
    }

    /// 读取当前版本、撤销其 current 标记并追加下一序号的 current 版本
    pub fn append_version(
        &mut self,
        store_id: StoreId,
        attrs: &VersionAttributes,
        creator: &Login,
    ) -> DomainResult<VersionId> {
        if self.store(store_id).is_none() {
            return Err(DomainError::StoreNotFound);
        }

        let number = match self.current_version(store_id) {
            Some(mut current) => {
                let number = current.version_number().next()?;
                current.retire();
                self.write(store_id, Write::PutVersion(current));
                number
            }
            None => self
                .working
                .versions_of(store_id)
                .iter()
                .map(StoreVersion::version_number)
                .max()
                .map_or(Ok(VersionNumber::first()), |n| n.next())?,
        };

        let version = StoreVersion::builder()
            .id(self.repo.next_version_id())
            .store_id(store_id)
            .version_number(number)
            .owner_name(attrs.owner_name.clone())
            .opening_time(attrs.opening_time.clone())
            .closing_time(attrs.closing_time.clone())
            .creator_login(creator.to_string())
            .created_at(Utc::now())
            .is_current(true)
            .build();
        let version_id = version.id();
        self.write(store_id, Write::PutVersion(version));
        Ok(version_id)
    }

    pub fn remove_store(&mut self, store_id: StoreId) -> DomainResult<()> {
        if self.store(store_id).is_none() {
            return Err(DomainError::StoreNotFound);
        }
        for version in self.working.versions_of(store_id) {
            self.write(store_id, Write::RemoveVersion(version.id()));
        }
        self.write(store_id, Write::RemoveStore(store_id));
        Ok(())
    }

    pub fn remove_version(&mut self, version_id: VersionId) -> DomainResult<()> {
        let store_id = self
            .working
            .versions
            .get(&version_id)
            .map(StoreVersion::store_id)
            .ok_or(DomainError::VersionNotFound)?;
        self.write(store_id, Write::RemoveVersion(version_id));
        Ok(())
    }

    /// 提交：校验修订号后重放写日志
    pub async fn commit(self) -> DomainResult<()> {
        let mut committed = self.repo.committed.write().await;

        for store_id in self.watched.iter().chain(self.dirty.iter()) {
            if committed.revisions.get(store_id) != self.base.get(store_id) {
                return Err(DomainError::conflict(format!(
                    "store {store_id} was modified by a concurrent transaction"
                )));
            }
        }

        for write in self.writes {
            committed.apply(write);
        }
        for store_id in self.dirty {
            let next = committed.revisions.get(&store_id).copied().unwrap_or(0) + 1;
            committed.revisions.insert(store_id, next);
        }
        Ok(())
    }

    fn write(&mut self, store_id: StoreId, write: Write) {
        self.dirty.insert(store_id);
        self.working.apply(write.clone());
        self.writes.push(write);
    }
}

#[async_trait]
impl VersionChainRepository for InMemoryVersionChainRepository {
    #[tracing::instrument(skip(self, attrs), fields(creator = %creator))]
    async fn create_store(&self, attrs: &NewStore, creator: &Login) -> DomainResult<StoreId> {
        let mut tx = self.begin().await;
        let (store_id, _) = tx.insert_store(attrs, creator);
        tx.commit().await?;
        tracing::debug!(%store_id, "store inserted with version 1");
        Ok(store_id)
    }

    #[tracing::instrument(skip(self, attrs), fields(store_id = %store_id, creator = %creator))]
    async fn create_version(
        &self,
        store_id: StoreId,
        attrs: &VersionAttributes,
        creator: &Login,
    ) -> DomainResult<VersionId> {
        let mut tx = self.begin().await;
        let version_id = tx.append_version(store_id, attrs, creator)?;
        tx.commit().await?;
        Ok(version_id)
    }

    #[tracing::instrument(skip(self), fields(store_id = %store_id))]
    async fn delete_store(&self, store_id: StoreId) -> DomainResult<()> {
        let mut tx = self.begin().await;
        tx.remove_store(store_id)?;
        tx.commit().await
    }

    #[tracing::instrument(skip(self), fields(version_id = %version_id))]
    async fn delete_version(&self, version_id: VersionId) -> DomainResult<()> {
        let mut tx = self.begin().await;
        tx.remove_version(version_id)?;
        tx.commit().await
    }

    async fn get_store(&self, store_id: StoreId) -> DomainResult<Option<Store>> {
        Ok(self.read().await.stores.get(&store_id).cloned())
    }

    async fn version_history(&self, store_id: StoreId) -> DomainResult<Vec<StoreVersion>> {
        let mut history = self.read().await.versions_of(store_id);
        sort_history(&mut history);
        Ok(history)
    }

    async fn get_version(&self, version_id: VersionId) -> DomainResult<Option<StoreVersion>> {
        Ok(self.read().await.versions.get(&version_id).cloned())
    }

    async fn get_store_version(
        &self,
        store_id: StoreId,
        version_id: VersionId,
    ) -> DomainResult<Option<StoreVersion>> {
        Ok(self
            .read()
            .await
            .versions
            .get(&version_id)
            .filter(|v| v.belongs_to(store_id))
            .cloned())
    }

    async fn check_creator(&self, store_id: StoreId, login: &Login) -> DomainResult<()> {
        match self.read().await.stores.get(&store_id) {
            None => Err(DomainError::StoreNotFound),
            Some(store) if store.is_created_by(login.as_str()) => Ok(()),
            Some(_) => Err(DomainError::PermissionDenied),
        }
    }
}
