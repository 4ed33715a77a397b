//! # Crate Error Types
//!
//! Unified error type for callers that combine configuration loading, circuit
//! breaker execution and health probing in one call path.

use crate::config::ConfigurationError;
use crate::health::ProbeError;
use crate::resilience::CircuitBreakerError;
use thiserror::Error;

/// Top-level error for resilience operations
#[derive(Error, Debug)]
pub enum ResilienceError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Circuit breaker for '{dependency}' is open, call refused")]
    CircuitOpen { dependency: String },

    #[error("Call to '{dependency}' timed out after {timeout_seconds}s")]
    Timeout {
        dependency: String,
        timeout_seconds: u64,
    },

    #[error("Dependency probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ResilienceError {
    /// Create a circuit open error
    pub fn circuit_open(dependency: impl Into<String>) -> Self {
        Self::CircuitOpen {
            dependency: dependency.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(dependency: impl Into<String>, timeout_seconds: u64) -> Self {
        Self::Timeout {
            dependency: dependency.into(),
            timeout_seconds,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Flatten a breaker-wrapped error so callers can bubble one error type with `?`
impl From<CircuitBreakerError<ResilienceError>> for ResilienceError {
    fn from(err: CircuitBreakerError<ResilienceError>) -> Self {
        match err {
            CircuitBreakerError::CircuitOpen { dependency } => Self::circuit_open(dependency),
            CircuitBreakerError::OperationFailed(inner) => inner,
            CircuitBreakerError::OperationTimedOut {
                dependency,
                timeout,
            } => Self::timeout(dependency, timeout.as_secs()),
        }
    }
}

/// Result type alias for resilience operations
pub type Result<T> = std::result::Result<T, ResilienceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let open = ResilienceError::circuit_open("dynamodb");
        assert_eq!(
            format!("{open}"),
            "Circuit breaker for 'dynamodb' is open, call refused"
        );

        let timeout = ResilienceError::timeout("kinesis", 5);
        assert!(format!("{timeout}").contains("timed out after 5s"));
    }

    #[test]
    fn test_breaker_error_flattens() {
        let refused: CircuitBreakerError<ResilienceError> = CircuitBreakerError::CircuitOpen {
            dependency: "dynamodb".to_string(),
        };
        assert!(matches!(
            ResilienceError::from(refused),
            ResilienceError::CircuitOpen { .. }
        ));

        let failed: CircuitBreakerError<ResilienceError> =
            CircuitBreakerError::OperationFailed(ResilienceError::internal("boom"));
        assert!(matches!(
            ResilienceError::from(failed),
            ResilienceError::Internal { .. }
        ));

        let timed_out: CircuitBreakerError<ResilienceError> =
            CircuitBreakerError::OperationTimedOut {
                dependency: "kinesis".to_string(),
                timeout: Duration::from_secs(3),
            };
        match ResilienceError::from(timed_out) {
            ResilienceError::Timeout {
                dependency,
                timeout_seconds,
            } => {
                assert_eq!(dependency, "kinesis");
                assert_eq!(timeout_seconds, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_configuration_error_converts() {
        let config_err = ConfigurationError::invalid_value(
            "circuit_breakers.default.failure_threshold",
            "0",
            "failure threshold must be at least 1",
        );
        let err: ResilienceError = config_err.into();
        assert!(matches!(err, ResilienceError::Configuration(_)));
    }
}
