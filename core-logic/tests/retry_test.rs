use core_logic::{is_transient_error, with_retry, NetworkError, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_retry_success_first_try() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "subgraph", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("data".to_string())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_success_after_timeouts() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "subgraph", || async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("request timed out"))
        } else {
            Ok("data".to_string())
        }
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_retries() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "subgraph", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("503 service unavailable"))
    })
    .await;

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("failed after 4 attempts"));
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_retry_stops_on_permanent_error() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "subgraph", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("invalid query: unknown field"))
    })
    .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_backoff_delay() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(2, 50).without_jitter();

    let start = tokio::time::Instant::now();
    let _: Result<String, anyhow::Error> = with_retry(config, "subgraph", || async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("connection reset"))
        } else {
            Ok("done".to_string())
        }
    })
    .await;

    // 50ms then 100ms
    assert_eq!(start.elapsed(), Duration::from_millis(150));
}

#[test]
fn test_transient_error_detection() {
    assert!(is_transient_error(&anyhow::anyhow!("Request timeout")));
    assert!(is_transient_error(&anyhow::anyhow!("HTTP 429 Too Many Requests")));
    assert!(is_transient_error(&anyhow::anyhow!("502 Bad Gateway")));
    assert!(is_transient_error(&anyhow::anyhow!("error sending request for url")));
}

#[test]
fn test_permanent_error_detection() {
    assert!(!is_transient_error(&anyhow::anyhow!("Invalid signature")));
    assert!(!is_transient_error(&anyhow::anyhow!(
        "insufficient funds for gas * price + value"
    )));
}

#[test]
fn test_subgraph_http_status_classification() {
    let http = |status_code| {
        anyhow::Error::from(NetworkError::HttpError {
            status_code,
            endpoint: "https://subgraph.test/graphql".to_string(),
        })
    };
    assert!(is_transient_error(&http(429)));
    assert!(is_transient_error(&http(503)));
    assert!(!is_transient_error(&http(400)));
}
