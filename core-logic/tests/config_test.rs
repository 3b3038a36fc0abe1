use core_logic::{ChainConfig, ConfigError, RetryPolicy, RunnerConfig};
use std::time::Duration;

fn bartio() -> ChainConfig {
    ChainConfig {
        name: "bArtio".to_string(),
        rpc_endpoint: "https://bartio.rpc.berachain.com".to_string(),
        chain_id: 80084,
        tx_explorer: "https://bartio.beratrail.io/tx/".to_string(),
    }
}

#[test]
fn test_runner_config_defaults() {
    let config = RunnerConfig::default();
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.inter_batch_delay(), Duration::ZERO);
    assert_eq!(config.retry_policy, RetryPolicy::All);
    assert!(config.validate().is_ok());
}

#[test]
fn test_runner_config_missing_fields_use_defaults() {
    let config: RunnerConfig = serde_json::from_str(r#"{"inter_batch_delay_ms": 5000}"#).unwrap();
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.inter_batch_delay(), Duration::from_secs(5));
}

#[test]
fn test_runner_config_rejects_zero_batch() {
    let err = RunnerConfig::new(0, 0).validate().unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "batch_size"),
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_runner_config_builder() {
    let config = RunnerConfig::new(5, 0)
        .with_delay_ms(1000)
        .with_retry_policy(RetryPolicy::TransientOnly);
    assert_eq!(config.batch_size, 5);
    assert_eq!(config.inter_batch_delay_ms, 1000);
    assert_eq!(config.retry_policy, RetryPolicy::TransientOnly);
}

#[test]
fn test_chain_config_tx_link() {
    assert_eq!(
        bartio().tx_link("0xabc"),
        "https://bartio.beratrail.io/tx/0xabc"
    );
}

#[test]
fn test_chain_config_validates_rpc() {
    assert!(bartio().validate().is_ok());

    let mut bad = bartio();
    bad.rpc_endpoint = "bartio.rpc.berachain.com".to_string();
    assert!(matches!(
        bad.validate(),
        Err(ConfigError::InvalidRpcUrl { .. })
    ));
}
