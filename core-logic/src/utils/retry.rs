use crate::traits::FailureReason;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Which failed wallets get the single retry pass of a batched run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Retry every failure once, whatever the reason.
    #[default]
    All,
    /// Skip failures that resubmitting cannot fix (insufficient funds, reverts).
    TransientOnly,
    /// No retry pass.
    None,
}

impl RetryPolicy {
    pub fn should_retry(&self, reason: Option<&FailureReason>) -> bool {
        match self {
            RetryPolicy::All => true,
            RetryPolicy::TransientOnly => !reason.is_some_and(FailureReason::is_permanent),
            RetryPolicy::None => false,
        }
    }
}

/// Backoff settings for retrying a single request (not a whole wallet).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30000,
            exponential_base: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms: base_delay_ms * 30,
            ..Default::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay_ms as f64 * self.exponential_base.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64);

        let delay_ms = if self.jitter {
            let rng_factor = rand::thread_rng().gen_range(0.5..=1.5);
            delay_ms * rng_factor
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms as u64)
    }
}

/// Retries `operation` while the error looks transient, with exponential backoff.
pub async fn with_retry<T, F, Fut>(
    config: RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt >= config.max_retries || !is_transient_error(&e) {
                    let error_msg = format!("{}", e);
                    return Err(e).context(format!(
                        "{} failed after {} attempts. Last error: {}",
                        operation_name,
                        attempt + 1,
                        error_msg
                    ));
                }

                let delay = config.calculate_delay(attempt);
                debug!(
                    "{} failed (attempt {}/{}). Retrying in {:?}: {}",
                    operation_name,
                    attempt + 1,
                    config.max_retries + 1,
                    delay,
                    e
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

pub fn is_transient_error(error: &anyhow::Error) -> bool {
    let error_msg = format!("{:?}", error).to_lowercase();

    let transient_patterns = [
        "timeout",
        "timed out",
        "connection refused",
        "connection reset",
        "network error",
        "error sending request",
        "temporary failure",
        "service unavailable",
        "bad gateway",
        "rate limited",
        "too many requests",
        "429",
        "502",
        "503",
    ];

    transient_patterns
        .iter()
        .any(|pattern| error_msg.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_all_retries_everything() {
        let policy = RetryPolicy::All;
        assert!(policy.should_retry(Some(&FailureReason::InsufficientFunds)));
        assert!(policy.should_retry(Some(&FailureReason::CallException)));
        assert!(policy.should_retry(None));
    }

    #[test]
    fn test_policy_transient_only() {
        let policy = RetryPolicy::TransientOnly;
        assert!(!policy.should_retry(Some(&FailureReason::InsufficientFunds)));
        assert!(!policy.should_retry(Some(&FailureReason::CallException)));
        assert!(policy.should_retry(Some(&FailureReason::Other("timeout".into()))));
        assert!(policy.should_retry(Some(&FailureReason::Precondition("CONVERSION_FAILED"))));
    }

    #[test]
    fn test_policy_none() {
        assert!(!RetryPolicy::None.should_retry(Some(&FailureReason::Other("x".into()))));
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let p: RetryPolicy = serde_json::from_str("\"transient_only\"").unwrap();
        assert_eq!(p, RetryPolicy::TransientOnly);
        let p: RetryPolicy = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(p, RetryPolicy::All);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig::new(10, 100).with_max_delay(250).without_jitter();
        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(5), Duration::from_millis(250));
    }
}
