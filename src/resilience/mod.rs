//! # Resilience Module
//!
//! Circuit breaker primitives for guarding calls into named external
//! dependencies. A process holds one [`CircuitBreakerManager`]; every call
//! site routes through it by dependency name and gets fault isolation,
//! bounded call timeouts and fail-fast behavior while a dependency is down.
//!
//! ## Architecture
//!
//! - **Circuit Breakers**: Per-dependency state machines that open after
//!   consecutive failures and recover through a single trial call
//! - **Outcome Classification**: Success, failure and timeout classification
//!   feeding the state machine
//! - **Status Reporting**: Non-blocking snapshots for health endpoints
//! - **Configuration**: Default thresholds with per-dependency overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resilience_core::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CircuitBreakerConfig {
//!     failure_threshold: 5,
//!     open_cooldown: Duration::from_secs(60),
//!     call_timeout: Duration::from_secs(5),
//! };
//!
//! let circuit_breaker = CircuitBreaker::new("dynamodb", config);
//!
//! let result = circuit_breaker
//!     .call(|| async {
//!         // Dependency round-trip here
//!         Ok::<&str, Box<dyn std::error::Error>>("table status: ACTIVE")
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod manager;
pub mod outcome;
pub mod status;

#[cfg(test)]
mod yaml_config_test;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerError, CircuitState};
pub use config::CircuitBreakerConfig;
pub use manager::CircuitBreakerManager;
pub use outcome::CallOutcome;
pub use status::{CircuitBreakerStatus, SystemStatusSummary};
