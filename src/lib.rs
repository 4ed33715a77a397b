#![allow(clippy::doc_markdown)] // Allow technical terms like DynamoDB, YAML in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Resilience Core
//!
//! Process-local circuit breaker core for guarding calls into external
//! dependencies.
//!
//! ## Overview
//!
//! Every call into an external dependency (DynamoDB, Kinesis, a partner API)
//! can hang or fail, and a dependency that is already down is only made worse
//! by retry traffic. This crate wraps those calls in per-dependency circuit
//! breakers: after a run of consecutive failures the breaker opens and calls
//! fail fast into a fallback, then a single trial call decides whether the
//! dependency has recovered.
//!
//! ## Architecture
//!
//! - **Per-dependency isolation**: each dependency gets its own breaker with
//!   independent counters, so a DynamoDB outage never affects Kinesis calls
//! - **Three-state machine**: closed (normal), open (failing fast), half-open
//!   (one trial call in flight)
//! - **Bounded waiting**: every guarded call runs under a timeout, and a
//!   timeout counts as a failure
//! - **Fallback-first API**: callers provide the degraded-mode answer up
//!   front; refusals and failures both route into it
//!
//! ## Key Features
//!
//! - **Lock-light hot path**: one short mutex hold per call decision, with
//!   the guarded operation awaited outside the lock
//! - **Cancellation safety**: a guarded call dropped mid-flight is committed
//!   as a failure, so an abandoned trial can never wedge a breaker half-open
//! - **Status reporting**: per-breaker snapshots and a system-wide summary
//!   with a health score, ready for a health endpoint
//! - **Health probes**: a probe layer that checks dependencies through their
//!   breakers, so health sweeps never hammer a failing system
//! - **YAML configuration**: per-dependency thresholds with environment
//!   overrides, validated at load time
//!
//! ## Module Organization
//!
//! - [`resilience`] - Circuit breaker state machine, manager and status types
//! - [`health`] - Dependency probes and composite health reports
//! - [`config`] - YAML configuration loading and validation
//! - [`logging`] - Structured logging setup (console + JSON file output)
//! - [`error`] - Crate-level error type for combined call paths
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resilience_core::{CircuitBreakerConfig, CircuitBreakerManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = CircuitBreakerManager::new(CircuitBreakerConfig::default());
//!
//! let answer = manager
//!     .execute(
//!         "dynamodb",
//!         || async {
//!             // call the real dependency here
//!             Ok::<_, String>("fresh value".to_string())
//!         },
//!         || async {
//!             // degraded-mode answer when the call fails or is refused
//!             Ok("cached value".to_string())
//!         },
//!     )
//!     .await?;
//!
//! println!("answer: {answer}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests including lifecycle and property tests
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod resilience;

pub use config::{ConfigManager, ConfigurationError, ResilienceConfig};
pub use error::{ResilienceError, Result};
pub use health::{
    DependencyProbe, DependencyReport, HealthChecker, HealthReport, HealthState, ProbeError,
};
pub use logging::init_structured_logging;
pub use resilience::{
    CallOutcome, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerManager,
    CircuitBreakerStatus, CircuitState, SystemStatusSummary,
};
