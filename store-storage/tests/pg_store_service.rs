//! 需要可写的 Postgres：
//! `DATABASE_URL=postgres://... cargo test -p store-storage -- --ignored`

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use store_application::context::AppContext;
use store_application::error::ErrorKind;
use store_application::{RetryPolicy, StoreService};
use store_domain::persist::PgVersionChainRepository;
use store_domain::store::{NewStore, VersionAttributes};
use store_domain::value_object::{Login, VersionId};
use tokio::task::JoinSet;

async fn service() -> anyhow::Result<Arc<StoreService<PgVersionChainRepository>>> {
    let url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new().max_connections(16).connect(&url).await?;
    let repo = PgVersionChainRepository::new(pool);
    repo.migrate().await?;
    Ok(Arc::new(StoreService::new(
        repo,
        RetryPolicy::new(50, Duration::from_millis(5)),
    )))
}

fn ctx(login: &str) -> anyhow::Result<AppContext> {
    Ok(AppContext::new(Login::new(login)?))
}

fn new_store() -> NewStore {
    NewStore {
        name: "Corner".into(),
        address: "Moscow, Tverskaya, 1".into(),
        owner_name: "John, Smith".into(),
        opening_time: "2024-01-01 08:00:00".into(),
        closing_time: "2024-01-01 20:00:00".into(),
    }
}

fn attrs(i: usize) -> VersionAttributes {
    VersionAttributes {
        owner_name: format!("Owner, Number{}", "x".repeat(i + 1)),
        opening_time: "2024-03-01 07:00:00".into(),
        closing_time: "2024-03-01 23:00:00".into(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_versions_through_service_all_commit() -> anyhow::Result<()> {
    let service = service().await?;
    let owner = ctx("user1")?;
    let store_id = service.create_store(&owner, &new_store()).await?;

    let mut set = JoinSet::new();
    for i in 0..8 {
        let service = Arc::clone(&service);
        let owner = owner.clone();
        set.spawn(async move { service.create_version(&owner, store_id, &attrs(i)).await });
    }
    let mut created: Vec<VersionId> = Vec::new();
    while let Some(joined) = set.join_next().await {
        created.push(joined??);
    }
    assert_eq!(created.len(), 8);

    let history = service.version_history(store_id).await?;
    assert_eq!(history.len(), 9);
    assert_eq!(history.iter().filter(|v| v.is_current()).count(), 1);

    let numbers: HashSet<i32> = history.iter().map(|v| v.version_number().value()).collect();
    assert_eq!(numbers, (1..=9).collect::<HashSet<_>>());
    assert_eq!(history[0].version_number().value(), 9);
    assert!(history[0].is_current());
    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn non_creator_cannot_delete() -> anyhow::Result<()> {
    let service = service().await?;
    let store_id = service.create_store(&ctx("user1")?, &new_store()).await?;
    let history = service.version_history(store_id).await?;

    let err = service
        .delete_store(&ctx("user2")?, store_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = service
        .delete_version(&ctx("user2")?, store_id, history[0].id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    service.delete_store(&ctx("user1")?, store_id).await?;
    let err = service.get_store(store_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}
