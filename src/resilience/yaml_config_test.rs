//! Tests wiring the YAML configuration layer into the breaker registry.

use crate::config::ResilienceConfig;
use crate::resilience::CircuitBreakerManager;
use std::time::Duration;

const SAMPLE_CONFIG: &str = r#"
circuit_breakers:
  enabled: true
  default:
    failure_threshold: 5
    open_cooldown_seconds: 60
    call_timeout_seconds: 5
  dependencies:
    dynamodb:
      failure_threshold: 3
      open_cooldown_seconds: 30
      call_timeout_seconds: 2
    kinesis:
      failure_threshold: 10
      open_cooldown_seconds: 120
      call_timeout_seconds: 5
"#;

#[tokio::test]
async fn test_manager_from_yaml_config() {
    let config: ResilienceConfig =
        serde_yaml::from_str(SAMPLE_CONFIG).expect("sample config parses");
    assert!(config.circuit_breakers.enabled);

    let manager = CircuitBreakerManager::from_config(&config);

    let dynamo = manager.get_or_create("dynamodb").await;
    assert_eq!(dynamo.config().failure_threshold, 3);
    assert_eq!(dynamo.config().open_cooldown, Duration::from_secs(30));
    assert_eq!(dynamo.config().call_timeout, Duration::from_secs(2));

    let kinesis = manager.get_or_create("kinesis").await;
    assert_eq!(kinesis.config().failure_threshold, 10);

    assert_eq!(
        manager.list_dependencies().await,
        vec!["dynamodb".to_string(), "kinesis".to_string()]
    );
    assert_eq!(manager.system_health_score().await, 1.0);
}

#[tokio::test]
async fn test_unlisted_dependency_uses_default_block() {
    let config: ResilienceConfig =
        serde_yaml::from_str(SAMPLE_CONFIG).expect("sample config parses");
    let manager = CircuitBreakerManager::from_config(&config);

    let s3 = manager.get_or_create("s3").await;
    assert_eq!(s3.config().failure_threshold, 5);
    assert_eq!(s3.config().open_cooldown, Duration::from_secs(60));
    assert_eq!(s3.config().call_timeout, Duration::from_secs(5));
}

#[tokio::test]
async fn test_forced_open_breaker_lowers_health_score() {
    let config: ResilienceConfig =
        serde_yaml::from_str(SAMPLE_CONFIG).expect("sample config parses");
    let manager = CircuitBreakerManager::from_config(&config);

    manager.get_or_create("dynamodb").await;
    manager.get_or_create("kinesis").await;

    assert!(manager.force_open("dynamodb").await);
    assert_eq!(manager.system_health_score().await, 0.5);

    let summary = manager.circuit_summary().await;
    assert!(summary.degraded);
    assert!(summary.breakers["dynamodb"].is_open());
}
