use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use store_application::error::{AppResult, GENERIC_ERROR_TEXT};
use store_application::result::ResultMessage;
use store_application::{CommandDispatcher, ResultNotifier, RetryPolicy, StoreService};
use store_domain::error::DomainResult;
use store_domain::persist::VersionChainRepository;
use store_domain::store::{NewStore, Store, StoreVersion, VersionAttributes};
use store_domain::value_object::{Login, StoreId, VersionId};

/// 每个调用都永远挂起，模拟卡在锁上的数据库
struct StalledRepository;

#[async_trait]
impl VersionChainRepository for StalledRepository {
    async fn create_store(&self, _: &NewStore, _: &Login) -> DomainResult<StoreId> {
        std::future::pending().await
    }

    async fn create_version(
        &self,
        _: StoreId,
        _: &VersionAttributes,
        _: &Login,
    ) -> DomainResult<VersionId> {
        std::future::pending().await
    }

    async fn delete_store(&self, _: StoreId) -> DomainResult<()> {
        std::future::pending().await
    }

    async fn delete_version(&self, _: VersionId) -> DomainResult<()> {
        std::future::pending().await
    }

    async fn get_store(&self, _: StoreId) -> DomainResult<Option<Store>> {
        std::future::pending().await
    }

    async fn version_history(&self, _: StoreId) -> DomainResult<Vec<StoreVersion>> {
        std::future::pending().await
    }

    async fn get_version(&self, _: VersionId) -> DomainResult<Option<StoreVersion>> {
        std::future::pending().await
    }

    async fn get_store_version(
        &self,
        _: StoreId,
        _: VersionId,
    ) -> DomainResult<Option<StoreVersion>> {
        std::future::pending().await
    }

    async fn check_creator(&self, _: StoreId, _: &Login) -> DomainResult<()> {
        std::future::pending().await
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    seen: Arc<Mutex<Vec<ResultMessage>>>,
}

#[async_trait]
impl ResultNotifier for RecordingNotifier {
    async fn notify(&self, result: &ResultMessage) -> AppResult<()> {
        self.seen.lock().unwrap().push(result.clone());
        Ok(())
    }
}

fn dispatcher(notifier: RecordingNotifier) -> CommandDispatcher<StalledRepository> {
    let service = Arc::new(StoreService::new(
        StalledRepository,
        RetryPolicy::new(1, Duration::from_millis(1)),
    ));
    CommandDispatcher::new(service, Arc::new(notifier))
        .with_command_timeout(Duration::from_millis(50))
}

fn message(action: &str, store_id: &str) -> Vec<u8> {
    json!({
        "action": action,
        "storeId": store_id,
        "versionId": "",
        "data": null,
        "userLogin": "user1",
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn stuck_query_is_reported_as_internal_error() {
    let notifier = RecordingNotifier::default();
    let dispatcher = dispatcher(notifier.clone());

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        dispatcher.handle(&message("get_store", "1")),
    )
    .await
    .expect("dispatcher gave up on the stuck repository");

    assert_eq!(result, Some(ResultMessage::error(GENERIC_ERROR_TEXT)));
    assert_eq!(
        notifier.seen.lock().unwrap().clone(),
        vec![ResultMessage::error(GENERIC_ERROR_TEXT)]
    );
}

#[tokio::test]
async fn stuck_mutation_frees_the_slot() {
    let dispatcher = dispatcher(RecordingNotifier::default());

    for _ in 0..3 {
        let result = tokio::time::timeout(
            Duration::from_secs(3),
            dispatcher.handle(&message("delete_store", "7")),
        )
        .await
        .expect("each command is bounded by the deadline");
        assert_eq!(result, Some(ResultMessage::error(GENERIC_ERROR_TEXT)));
    }
}
