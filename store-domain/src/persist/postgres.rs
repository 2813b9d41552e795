//! Postgres 版本链仓储（PgVersionChainRepository）
//!
//! 写操作统一在 `SERIALIZABLE` 隔离级别的事务中执行；序列化失败（40001）、
//! 死锁（40P01）与唯一约束冲突（23505）均转换为可重试的 `DomainError::Conflict`。
//!
//! # Schema
//!
//! 由 [`migrate()`](PgVersionChainRepository::migrate) 幂等创建：
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS stores (
//!     store_id      BIGSERIAL PRIMARY KEY,
//!     name          TEXT NOT NULL,
//!     address       TEXT NOT NULL,
//!     creator_login TEXT NOT NULL,
//!     owner_name    TEXT NOT NULL,
//!     opening_time  TEXT NOT NULL,
//!     closing_time  TEXT NOT NULL,
//!     created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//!
//! CREATE TABLE IF NOT EXISTS store_versions (
//!     version_id     BIGSERIAL PRIMARY KEY,
//!     store_id       BIGINT NOT NULL REFERENCES stores (store_id),
//!     version_number INTEGER NOT NULL,
//!     creator_login  TEXT NOT NULL,
//!     owner_name     TEXT NOT NULL,
//!     opening_time   TEXT NOT NULL,
//!     closing_time   TEXT NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     is_current     BOOLEAN NOT NULL DEFAULT FALSE,
//!     UNIQUE (store_id, version_number)
//! );
//!
//! CREATE UNIQUE INDEX IF NOT EXISTS store_versions_one_current
//!     ON store_versions (store_id) WHERE is_current;
//! ```
use crate::error::{DomainError, DomainResult};
use crate::persist::VersionChainRepository;
use crate::store::{NewStore, Store, StoreVersion, VersionAttributes};
use crate::value_object::{Login, StoreId, VersionId, VersionNumber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

const VERSION_COLUMNS: &str = "version_id, store_id, version_number, creator_login, owner_name, \
     opening_time, closing_time, created_at, is_current";

/// 基于 sqlx 连接池的版本链仓储
#[derive(Clone)]
pub struct PgVersionChainRepository {
    pool: PgPool,
}

impl PgVersionChainRepository {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 应用表结构（幂等）
    ///
    /// 使用 `CREATE ... IF NOT EXISTS` 形式的 DDL，可在每次启动时执行。
    #[tracing::instrument(skip(self))]
    pub async fn migrate(&self) -> DomainResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS stores (
                store_id      BIGSERIAL PRIMARY KEY,
                name          TEXT NOT NULL,
                address       TEXT NOT NULL,
                creator_login TEXT NOT NULL,
                owner_name    TEXT NOT NULL,
                opening_time  TEXT NOT NULL,
                closing_time  TEXT NOT NULL,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS store_versions (
                version_id     BIGSERIAL PRIMARY KEY,
                store_id       BIGINT NOT NULL REFERENCES stores (store_id),
                version_number INTEGER NOT NULL,
                creator_login  TEXT NOT NULL,
                owner_name     TEXT NOT NULL,
                opening_time   TEXT NOT NULL,
                closing_time   TEXT NOT NULL,
                created_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
                is_current     BOOLEAN NOT NULL DEFAULT FALSE,
                UNIQUE (store_id, version_number)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS store_versions_one_current
                ON store_versions (store_id) WHERE is_current
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn begin_serializable(&self) -> DomainResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn insert_version(
        tx: &mut Transaction<'_, Postgres>,
        store_id: StoreId,
        number: VersionNumber,
        attrs: &VersionAttributes,
        creator: &Login,
        created_at: DateTime<Utc>,
    ) -> DomainResult<VersionId> {
        let version_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO store_versions (store_id, version_number, creator_login, owner_name,
                                        opening_time, closing_time, created_at, is_current)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING version_id
            ",
        )
        .bind(store_id.value())
        .bind(number.value())
        .bind(creator.as_str())
        .bind(&attrs.owner_name)
        .bind(&attrs.opening_time)
        .bind(&attrs.closing_time)
        .bind(created_at)
        .fetch_one(&mut **tx)
        .await?;
        Ok(VersionId::new(version_id))
    }
}

fn store_from_row(row: &PgRow) -> Result<Store, sqlx::Error> {
    Ok(Store::builder()
        .id(StoreId::new(row.try_get("store_id")?))
        .name(row.try_get("name")?)
        .address(row.try_get("address")?)
        .owner_name(row.try_get("owner_name")?)
        .opening_time(row.try_get("opening_time")?)
        .closing_time(row.try_get("closing_time")?)
        .creator_login(row.try_get("creator_login")?)
        .created_at(row.try_get("created_at")?)
        .build())
}

fn version_from_row(row: &PgRow) -> Result<StoreVersion, sqlx::Error> {
    Ok(StoreVersion::builder()
        .id(VersionId::new(row.try_get("version_id")?))
        .store_id(StoreId::new(row.try_get("store_id")?))
        .version_number(VersionNumber::from_value(row.try_get("version_number")?))
        .owner_name(row.try_get("owner_name")?)
        .opening_time(row.try_get("opening_time")?)
        .closing_time(row.try_get("closing_time")?)
        .creator_login(row.try_get("creator_login")?)
        .created_at(row.try_get("created_at")?)
        .is_current(row.try_get("is_current")?)
        .build())
}

#[async_trait]
impl VersionChainRepository for PgVersionChainRepository {
    #[tracing::instrument(skip(self, attrs), fields(creator = %creator), err)]
    async fn create_store(&self, attrs: &NewStore, creator: &Login) -> DomainResult<StoreId> {
        let mut tx = self.begin_serializable().await?;
        let created_at = Utc::now();

        let store_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO stores (name, address, creator_login, owner_name,
                                opening_time, closing_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING store_id
            ",
        )
        .bind(&attrs.name)
        .bind(&attrs.address)
        .bind(creator.as_str())
        .bind(&attrs.owner_name)
        .bind(&attrs.opening_time)
        .bind(&attrs.closing_time)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;
        let store_id = StoreId::new(store_id);

        Self::insert_version(
            &mut tx,
            store_id,
            VersionNumber::first(),
            &attrs.version_attributes(),
            creator,
            created_at,
        )
        .await?;

        tx.commit().await?;
        Ok(store_id)
    }

    #[tracing::instrument(skip(self, attrs), fields(store_id = %store_id, creator = %creator), err)]
    async fn create_version(
        &self,
        store_id: StoreId,
        attrs: &VersionAttributes,
        creator: &Login,
    ) -> DomainResult<VersionId> {
        let mut tx = self.begin_serializable().await?;

        let current: Option<(i64, i32)> = sqlx::query_as(
            r"
            SELECT version_id, version_number
            FROM store_versions
            WHERE store_id = $1 AND is_current
            ",
        )
        .bind(store_id.value())
        .fetch_optional(&mut *tx)
        .await?;

        let number = match current {
            Some((version_id, number)) => {
                sqlx::query("UPDATE store_versions SET is_current = FALSE WHERE version_id = $1")
                    .bind(version_id)
                    .execute(&mut *tx)
                    .await?;
                VersionNumber::from_value(number).next()?
            }
            None => {
                let max: Option<i32> = sqlx::query_scalar(
                    "SELECT MAX(version_number) FROM store_versions WHERE store_id = $1",
                )
                .bind(store_id.value())
                .fetch_one(&mut *tx)
                .await?;
                max.map_or(Ok(VersionNumber::first()), |n| {
                    VersionNumber::from_value(n).next()
                })?
            }
        };

        let version_id =
            Self::insert_version(&mut tx, store_id, number, attrs, creator, Utc::now()).await?;

        tx.commit().await?;
        Ok(version_id)
    }

    #[tracing::instrument(skip(self), fields(store_id = %store_id), err)]
    async fn delete_store(&self, store_id: StoreId) -> DomainResult<()> {
        let mut tx = self.begin_serializable().await?;

        sqlx::query("DELETE FROM store_versions WHERE store_id = $1")
            .bind(store_id.value())
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM stores WHERE store_id = $1")
            .bind(store_id.value())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(DomainError::StoreNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(version_id = %version_id), err)]
    async fn delete_version(&self, version_id: VersionId) -> DomainResult<()> {
        let mut tx = self.begin_serializable().await?;

        let deleted = sqlx::query("DELETE FROM store_versions WHERE version_id = $1")
            .bind(version_id.value())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(DomainError::VersionNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(store_id = %store_id))]
    async fn get_store(&self, store_id: StoreId) -> DomainResult<Option<Store>> {
        let row = sqlx::query(
            r"
            SELECT store_id, name, address, creator_login, owner_name,
                   opening_time, closing_time, created_at
            FROM stores
            WHERE store_id = $1
            ",
        )
        .bind(store_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(store_from_row).transpose()?)
    }

    #[tracing::instrument(skip(self), fields(store_id = %store_id))]
    async fn version_history(&self, store_id: StoreId) -> DomainResult<Vec<StoreVersion>> {
        let rows = sqlx::query(&format!(
            "SELECT {VERSION_COLUMNS} FROM store_versions WHERE store_id = $1 \
             ORDER BY created_at DESC, version_number DESC"
        ))
        .bind(store_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(version_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[tracing::instrument(skip(self), fields(version_id = %version_id))]
    async fn get_version(&self, version_id: VersionId) -> DomainResult<Option<StoreVersion>> {
        let row = sqlx::query(&format!(
            "SELECT {VERSION_COLUMNS} FROM store_versions WHERE version_id = $1"
        ))
        .bind(version_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(version_from_row).transpose()?)
    }

    #[tracing::instrument(skip(self), fields(store_id = %store_id, version_id = %version_id))]
    async fn get_store_version(
        &self,
        store_id: StoreId,
        version_id: VersionId,
    ) -> DomainResult<Option<StoreVersion>> {
        let row = sqlx::query(&format!(
            "SELECT {VERSION_COLUMNS} FROM store_versions WHERE store_id = $1 AND version_id = $2"
        ))
        .bind(store_id.value())
        .bind(version_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(version_from_row).transpose()?)
    }

    #[tracing::instrument(skip(self), fields(store_id = %store_id, login = %login))]
    async fn check_creator(&self, store_id: StoreId, login: &Login) -> DomainResult<()> {
        let creator: Option<String> =
            sqlx::query_scalar("SELECT creator_login FROM stores WHERE store_id = $1")
                .bind(store_id.value())
                .fetch_optional(&self.pool)
                .await?;

        match creator {
            None => Err(DomainError::StoreNotFound),
            Some(creator) if creator == login.as_str() => Ok(()),
            Some(_) => Err(DomainError::PermissionDenied),
        }
    }
}
