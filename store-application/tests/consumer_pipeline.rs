use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use store_application::command::StoreCommand;
use store_application::context::AppContext;
use store_application::error::AppResult;
use store_application::result::ResultMessage;
use store_application::{
    CommandConsumer, CommandDispatcher, CommandPublisher, ConsumerConfig, ResultNotifier,
    RetryPolicy, StoreService,
};
use store_domain::persist::{InMemoryVersionChainRepository, VersionChainRepository};
use store_domain::queue::{CommandQueue, InMemoryCommandQueue};
use store_domain::store::{NewStore, StoreVersion, VersionAttributes};
use store_domain::value_object::{Login, StoreId};
use tokio::sync::Notify;

#[derive(Default)]
struct CountingNotifier {
    seen: Mutex<Vec<ResultMessage>>,
    notify: Notify,
}

impl CountingNotifier {
    async fn wait_for(&self, n: usize) -> Vec<ResultMessage> {
        loop {
            let notified = self.notify.notified();
            {
                let seen = self.seen.lock().unwrap();
                if seen.len() >= n {
                    return seen.clone();
                }
            }
            notified.await;
        }
    }
}

#[async_trait]
impl ResultNotifier for CountingNotifier {
    async fn notify(&self, result: &ResultMessage) -> AppResult<()> {
        self.seen.lock().unwrap().push(result.clone());
        self.notify.notify_waiters();
        Ok(())
    }
}

struct Pipeline {
    repo: Arc<InMemoryVersionChainRepository>,
    queue: Arc<InMemoryCommandQueue>,
    notifier: Arc<CountingNotifier>,
    consumer: Arc<CommandConsumer<Arc<InMemoryVersionChainRepository>>>,
    publisher: CommandPublisher,
}

fn pipeline(concurrency: usize) -> Pipeline {
    let repo = Arc::new(InMemoryVersionChainRepository::new());
    let queue = Arc::new(InMemoryCommandQueue::new(64));
    let notifier = Arc::new(CountingNotifier::default());
    let service = Arc::new(StoreService::new(
        repo.clone(),
        RetryPolicy::new(10, Duration::from_millis(1)),
    ));
    let dispatcher = Arc::new(CommandDispatcher::new(service, notifier.clone()));
    let consumer = Arc::new(
        CommandConsumer::builder()
            .queue(queue.clone() as Arc<dyn CommandQueue>)
            .dispatcher(dispatcher)
            .config(ConsumerConfig { concurrency })
            .build(),
    );
    let publisher = CommandPublisher::new(queue.clone(), Duration::from_secs(1));
    Pipeline {
        repo,
        queue,
        notifier,
        consumer,
        publisher,
    }
}

fn ctx(login: &str) -> AppContext {
    AppContext::new(Login::new(login).unwrap())
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

fn attrs() -> VersionAttributes {
    VersionAttributes {
        owner_name: "Jane, Doe".into(),
        opening_time: "2024-02-01 09:00:00".into(),
        closing_time: "2024-02-01 21:00:00".into(),
    }
}

fn current_versions(history: &[StoreVersion]) -> usize {
    history.iter().filter(|v| v.is_current()).count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn published_commands_are_consumed_and_reported() {
    let p = pipeline(4);
    let handle = p.consumer.clone().start().await.unwrap();

    p.publisher
        .publish(&ctx("user1"), &StoreCommand::CreateStore(new_store()))
        .await
        .unwrap();
    let results = tokio::time::timeout(Duration::from_secs(5), p.notifier.wait_for(1))
        .await
        .unwrap();
    assert!(!results[0].is_error());

    let store_id = StoreId::new(1);
    for _ in 0..8 {
        p.publisher
            .publish(
                &ctx("user1"),
                &StoreCommand::CreateVersion {
                    store_id,
                    attrs: attrs(),
                },
            )
            .await
            .unwrap();
    }
    let results = tokio::time::timeout(Duration::from_secs(5), p.notifier.wait_for(9))
        .await
        .unwrap();
    assert!(results.iter().all(|r| !r.is_error()));

    let history = p.repo.version_history(store_id).await.unwrap();
    assert_eq!(history.len(), 9);
    assert_eq!(current_versions(&history), 1);
    assert_eq!(history[0].version_number().value(), 9);

    handle.shutdown();
    handle.join().await;
}

#[tokio::test]
async fn shutdown_stops_the_loop_without_draining() {
    let p = pipeline(1);
    let handle = p.consumer.clone().start().await.unwrap();

    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(1), handle.join())
        .await
        .unwrap();

    // 循环退出后接收端已释放，发布可能直接失败
    let _ = p
        .publisher
        .publish(&ctx("user1"), &StoreCommand::CreateStore(new_store()))
        .await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(p.repo.get_store(StoreId::new(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn closed_queue_ends_the_loop() {
    let p = pipeline(2);
    let mut handle = p.consumer.clone().start().await.unwrap();

    p.queue.close().await;
    tokio::time::timeout(Duration::from_secs(1), handle.stopped())
        .await
        .unwrap();
    handle.join().await;
}
