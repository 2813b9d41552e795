//! 门店变更/查询服务（StoreService）
//!
//! 在委托仓储前校验前置条件：
//! - 追加版本要求门店存在；
//! - 删除门店/版本要求目标存在且调用者为门店创建者，存在性先于权限校验；
//! - 历史为空视为门店不存在；
//! - 版本链冲突按 `RetryPolicy` 重试，耗尽后转换为持久化错误。
//!
use store_domain::error::DomainError;
use store_domain::persist::VersionChainRepository;
use store_domain::store::{NewStore, Store, StoreVersion, VersionAttributes};
use store_domain::value_object::{StoreId, ValueObject, VersionId};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::retry::RetryPolicy;

pub struct StoreService<R> {
    repo: R,
    retry: RetryPolicy,
}

impl<R> StoreService<R>
where
    R: VersionChainRepository,
{
    pub fn new(repo: R, retry: RetryPolicy) -> Self {
        Self { repo, retry }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    #[tracing::instrument(skip(self, ctx, attrs), fields(login = %ctx.login))]
    pub async fn create_store(&self, ctx: &AppContext, attrs: &NewStore) -> AppResult<StoreId> {
        attrs.validate()?;
        let store_id = self
            .with_conflict_retry("create_store", || {
                self.repo.create_store(attrs, &ctx.login)
            })
            .await?;
        tracing::info!(%store_id, "store created");
        Ok(store_id)
    }

    #[tracing::instrument(skip(self, ctx, attrs), fields(login = %ctx.login, store_id = %store_id))]
    pub async fn create_version(
        &self,
        ctx: &AppContext,
        store_id: StoreId,
        attrs: &VersionAttributes,
    ) -> AppResult<VersionId> {
        attrs.validate()?;
        if self.repo.get_store(store_id).await?.is_none() {
            return Err(DomainError::StoreNotFound.into());
        }
        let version_id = self
            .with_conflict_retry("create_version", || {
                self.repo.create_version(store_id, attrs, &ctx.login)
            })
            .await?;
        tracing::info!(%version_id, "store version created");
        Ok(version_id)
    }

    #[tracing::instrument(skip(self, ctx), fields(login = %ctx.login, store_id = %store_id))]
    pub async fn delete_store(&self, ctx: &AppContext, store_id: StoreId) -> AppResult<()> {
        self.repo.check_creator(store_id, &ctx.login).await?;
        self.with_conflict_retry("delete_store", || self.repo.delete_store(store_id))
            .await?;
        Ok(())
    }

    #[tracing::instrument(
        skip(self, ctx),
        fields(login = %ctx.login, store_id = %store_id, version_id = %version_id)
    )]
    pub async fn delete_version(
        &self,
        ctx: &AppContext,
        store_id: StoreId,
        version_id: VersionId,
    ) -> AppResult<()> {
        if self
            .repo
            .get_store_version(store_id, version_id)
            .await?
            .is_none()
        {
            return Err(DomainError::VersionNotFound.into());
        }
        self.repo.check_creator(store_id, &ctx.login).await?;
        self.with_conflict_retry("delete_version", || {
            self.repo.delete_version(version_id)
        })
        .await?;
        Ok(())
    }

    pub async fn get_store(&self, store_id: StoreId) -> AppResult<Store> {
        self.repo
            .get_store(store_id)
            .await?
            .ok_or_else(|| DomainError::StoreNotFound.into())
    }

    pub async fn version_history(&self, store_id: StoreId) -> AppResult<Vec<StoreVersion>> {
        let history = self.repo.version_history(store_id).await?;
        if history.is_empty() {
            return Err(DomainError::StoreNotFound.into());
        }
        Ok(history)
    }

    pub async fn get_version(
        &self,
        store_id: StoreId,
        version_id: VersionId,
    ) -> AppResult<StoreVersion> {
        self.repo
            .get_store_version(store_id, version_id)
            .await?
            .ok_or_else(|| DomainError::VersionNotFound.into())
    }

    async fn with_conflict_retry<T, F, Fut>(&self, what: &str, op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, DomainError>>,
    {
        let attempts = self.retry.attempts;
        self.retry
            .run_while(what, DomainError::is_conflict, op)
            .await
            .map_err(|err| match err {
                DomainError::Conflict { reason } => DomainError::persistence(format!(
                    "version chain conflict persisted after {attempts} attempts: {reason}"
                ))
                .into(),
                other => other.into(),
            })
    }
}
