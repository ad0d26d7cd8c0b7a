use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

/// 控制請求的重試策略。只重試網路層錯誤 (mock service 尚未啟動)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 只嘗試一次
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "🔁 {} attempt {}/{} failed: {}",
                        operation,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{ControlError, TransportFailure};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transport_error(kind: TransportFailure) -> ControlError {
        ControlError::Transport {
            method: "DELETE".to_string(),
            url: "http://localhost:1/interactions".to_string(),
            kind,
            message: kind.to_string(),
        }
    }

    fn connect_error() -> ControlError {
        transport_error(TransportFailure::Connect)
    }

    #[tokio::test]
    async fn test_retries_transport_errors_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result = policy
            .run("clear interactions", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(connect_error())
                } else {
                    Ok("cleared")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "cleared");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_timeouts_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result = policy
            .run("add interaction", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(transport_error(TransportFailure::Timeout))
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let result: Result<()> = policy
            .run("verify", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(connect_error())
            })
            .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_protocol_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let result: Result<()> = policy
            .run("verify", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ControlError::Protocol {
                    operation: "verify".to_string(),
                    status: 500,
                    body: "Missing requests".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(ControlError::Protocol { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_attempts_is_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
