//! Runtime circuit breaker settings.
//!
//! These are the in-memory settings a [`super::CircuitBreaker`] is constructed
//! with. The YAML-facing representation lives in [`crate::config`] and is
//! converted into this form at startup.

use std::time::Duration;

/// Thresholds and timing for a single circuit breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures since entering the closed state before the circuit opens
    pub failure_threshold: u32,

    /// How long the circuit stays open before a single trial call is allowed
    pub open_cooldown: Duration,

    /// Upper bound on the execution of one guarded operation
    pub call_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_cooldown: Duration::from_secs(60),
            call_timeout: Duration::from_secs(5),
        }
    }
}
