//! 有界重试（RetryPolicy）
//!
//! 基于 `backoff` 的固定间隔、有限次数重试：
//! - 启动期连接（数据库、代理、认证服务）对任意错误重试；
//! - 服务层只对版本链冲突重试（`Transient`），其余错误标记为 `Permanent` 立即返回。
//!
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（至少 1 次）
    pub attempts: u32,
    /// 两次尝试之间的固定等待
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// 任意错误都重试，返回最后一次的错误
    pub async fn run<T, E, F, Fut>(&self, what: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_while(what, |_| true, op).await
    }

    /// 仅当 `retryable` 为真时重试
    pub async fn run_while<T, E, F, Fut, P>(
        &self,
        what: &str,
        retryable: P,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let retryable = &retryable;
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        let operation = || {
            let fut = op();
            async move {
                fut.await.map_err(|err| {
                    if retryable(&err) {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        };
        let notify = |err: E, next: Duration| {
            tracing::warn!(
                what,
                attempt,
                attempts,
                retry_in_ms = next.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            attempt += 1;
        };

        backoff::future::retry_notify(self.schedule(), operation, notify).await
    }

    fn schedule(&self) -> CappedConstant {
        CappedConstant::new(self.delay, self.attempts.max(1) - 1)
    }
}

/// 固定间隔，最多重试 `retries` 次
#[derive(Debug, Clone)]
struct CappedConstant {
    delay: Duration,
    retries: u32,
    remaining: u32,
}

impl CappedConstant {
    fn new(delay: Duration, retries: u32) -> Self {
        Self {
            delay,
            retries,
            remaining: retries,
        }
    }
}

impl Backoff for CappedConstant {
    fn reset(&mut self) {
        self.remaining = self.retries;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let out: Result<u32, String> = fast(5)
            .run("flaky", || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 { Err(format!("fail {n}")) } else { Ok(n) }
                }
            })
            .await;
        assert_eq!(out, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let out: Result<(), String> = fast(4)
            .run("down", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("unreachable".to_string())
                }
            })
            .await;
        assert_eq!(out, Err("unreachable".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let out: Result<(), String> = fast(4)
            .run_while(
                "strict",
                |e: &String| e == "conflict",
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err("denied".to_string())
                    }
                },
            )
            .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_attempt_never_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let out: Result<(), String> = fast(1)
            .run("once", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                }
            })
            .await;
        assert_eq!(out, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schedule_is_capped_and_resettable() {
        let mut schedule = RetryPolicy::new(3, Duration::from_millis(20)).schedule();
        assert_eq!(schedule.next_backoff(), Some(Duration::from_millis(20)));
        assert_eq!(schedule.next_backoff(), Some(Duration::from_millis(20)));
        assert_eq!(schedule.next_backoff(), None);

        schedule.reset();
        assert_eq!(schedule.next_backoff(), Some(Duration::from_millis(20)));
    }
}
