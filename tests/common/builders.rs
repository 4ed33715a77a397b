//! Shared helpers for circuit breaker integration tests.
//! Breakers under test use short cooldowns and timeouts so lifecycle tests
//! complete in tens of milliseconds instead of real-world minutes.

#![allow(dead_code)] // Not every integration test binary uses every helper

use resilience_core::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerManager};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Initialize console logging for a test binary; safe to call repeatedly
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .try_init();
}

/// Breaker configuration with test-scale durations
pub fn fast_breaker_config(failure_threshold: u32) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold,
        open_cooldown: Duration::from_millis(100),
        call_timeout: Duration::from_millis(250),
    }
}

/// A standalone breaker with test-scale durations
pub fn fast_breaker(name: &str, failure_threshold: u32) -> CircuitBreaker {
    CircuitBreaker::new(name, fast_breaker_config(failure_threshold))
}

/// A manager whose default configuration uses test-scale durations
pub fn fast_manager(failure_threshold: u32) -> Arc<CircuitBreakerManager> {
    Arc::new(CircuitBreakerManager::new(fast_breaker_config(
        failure_threshold,
    )))
}
